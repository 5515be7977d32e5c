// Shared tuning constants for the engine and its front ends.

// Canvas
pub const CANVAS_WIDTH: f64 = 900.0;
pub const CANVAS_HEIGHT: f64 = 600.0;

// Level generation
pub const DEFAULT_NUM_CELLS: usize = 40;
pub const LEVEL_MARGIN: f64 = 30.0; // distance from the canvas edge for fresh sites
pub const DEFAULT_SPREAD_FACTOR: f64 = 0.2; // 0 = uniform, towards 1 = pushed to the far edge

// Auxiliary border ring
pub const BORDER_SITE_SPACING: f64 = 50.0; // distance between invisible border sites
pub const BORDER_SITE_OFFSET: f64 = 30.0; // how far outside the canvas the ring sits

// Repulsion
pub const DEFAULT_PUSH_RADIUS: f64 = 40.0;
pub const DEFAULT_PUSH_FACTOR: f64 = 0.5;
pub const DEFAULT_SIZE_INFLUENCE: f64 = 0.5;
pub const DEFAULT_BOUNDARY_MARGIN: f64 = 20.0;
pub const MIN_PUSH_DISTANCE: f64 = 1e-4; // coincident pairs have no separation axis
pub const SIZE_INFLUENCE_EXACT_EPS: f64 = 1e-6; // winner-take-all branch at sizeInfluence == 1

// Unclump passes after regenerating sites
pub const RELAX_PASSES_SMALL: usize = 10;
pub const RELAX_PASSES_LARGE: usize = 30;
pub const RELAX_LARGE_SITE_COUNT: usize = 50;

// Weights and territories
pub const DEFAULT_WEIGHT_ITERATIONS: usize = 5;
pub const DEFAULT_PROPAGATION_ITERATIONS: usize = 12;
pub const DEFAULT_BALANCE_TOLERANCE: f64 = 0.05; // fraction of canvas area
pub const DEFAULT_MAX_SEED_RETRIES: usize = 50;

// Harmony
pub const HARMONY_TOLERANCE: f64 = 0.05;
pub const HARMONY_MAX_TERM: u32 = 5; // p/q with p, q in 1..=5
pub const DEFAULT_HARMONY_INFLUENCE: f64 = 0.5;

// Area -> pitch curve
pub const FREQ_MAX_HZ: f64 = 1200.0; // smallest cells sing highest
pub const FREQ_MIN_HZ: f64 = 50.0;
pub const FREQ_FALLBACK_HZ: f64 = 220.0; // cell without polygon
pub const DEFAULT_FREQ_THRESHOLD: f64 = 0.1;

// Area -> luminance curve
pub const DEFAULT_COLOR_THRESHOLD: f64 = 0.1;

// Note spreading
pub const DEFAULT_SPREAD_TIME: f64 = 0.5; // slider position, mapped to 50..1000 ms
pub const DEFAULT_SPREAD_DEPTH: usize = 3;
pub const SPREAD_TIME_BASE_MS: f64 = 50.0;
pub const SPREAD_TIME_RANGE: f64 = 20.0;
pub const DISTANCE_DELAY_SEC_PER_PX: f64 = 0.003;
pub const NOTE_DURATION_SEC: f64 = 2.0;
pub const NOTE_STOP_PAD_SEC: f64 = 0.1;
pub const DEFAULT_NOTE_RELEASE_SEC: f64 = 1.0;

// Drag tones
pub const DRAG_TONE_DEPTH: usize = 2;
pub const DEFAULT_DRAG_TONE_VOLUME: f64 = 0.3;
pub const LARGEST_NEIGHBOR_TONE_VOLUME: f64 = 0.5;

// Interaction
pub const DRAG_PICK_RADIUS: f64 = 10.0;
pub const REPEL_THRESHOLD: f64 = 60.0; // drag slows down when this close to another site
pub const DRAG_SLOW_FACTOR: f64 = 0.2;
pub const DRAG_MOVE_THRESHOLD: f64 = 1.0; // px before a drag counts as a move
pub const DRAG_BLOCKED_EPS: f64 = 1e-3;

// Territory palette
pub const COLOR_A_RGB: [u8; 3] = [0xFF, 0x8B, 0xA7]; // pink
pub const COLOR_B_RGB: [u8; 3] = [0x76, 0xFF, 0xE8]; // mint
