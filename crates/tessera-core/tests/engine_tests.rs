// Tests for the engine context: layout generation, seeding, cache
// invalidation and the pointer gestures.

use std::cell::Cell;

use glam::DVec2;
use tessera_core::{
    AudioEvent, CellGraph, Color, DelaunayProvider, EngineConfig, EngineWarning, FillBlend,
    FrameCapture, GameEngine, GeometryProvider, LevelKind, NullAudio, PointerDown, Rect,
    Tessellation, ToneStop,
};

fn quiet_config() -> EngineConfig {
    let mut c = EngineConfig::default();
    c.use_border_sites = false;
    c
}

fn small_engine(sites: Vec<DVec2>) -> GameEngine {
    let mut engine = GameEngine::new(quiet_config(), Rect::from_size(300.0, 200.0), 7);
    engine.set_sites(sites);
    engine
}

#[test]
fn same_seed_gives_same_layout() {
    let mut config = EngineConfig::default();
    config.set("maxSeedRetries", 1.0).expect("known");
    let canvas = Rect::from_size(900.0, 600.0);

    let mut a = GameEngine::new(config.clone(), canvas, 42);
    let mut b = GameEngine::new(config, canvas, 42);
    let out_a = a.seed_balanced();
    let out_b = b.seed_balanced();

    assert_eq!(a.sites(), b.sites());
    assert_eq!(a.territory().cells(), b.territory().cells());
    assert_eq!(out_a, out_b);
}

#[test]
fn generated_layout_respects_count_and_margin() {
    let mut config = EngineConfig::default();
    config.level = LevelKind::Random;
    let canvas = Rect::from_size(900.0, 600.0);
    let mut engine = GameEngine::new(config, canvas, 3);
    engine.generate_layout();

    assert_eq!(engine.sites().len(), 40);
    let inner = canvas.inset(engine.config().boundary_margin);
    assert!(engine.sites().iter().all(|p| inner.contains(*p)));
    assert!(engine.territory().cells().iter().all(|c| !c.color.is_colored()));
}

#[test]
fn retry_bound_surfaces_a_warning() {
    let mut config = EngineConfig::default();
    config.level = LevelKind::Random;
    config.set("maxSeedRetries", 1.0).expect("known");
    config.set("balanceTolerance", 0.0).expect("known");
    let mut engine = GameEngine::new(config, Rect::from_size(900.0, 600.0), 11);

    let outcome = engine.seed_balanced();
    assert!(!outcome.balanced);
    assert_eq!(outcome.attempts, 1);
    assert!(matches!(
        outcome.warnings.last(),
        Some(EngineWarning::Unbalanced { attempts: 1, .. })
    ));
}

// Real cell polygons, but every cell touches every other one, so no pair of
// disjoint seeds exists. The first `real_builds` builds use the true graph.
struct FullyConnected {
    real_builds: usize,
    builds: Cell<usize>,
}

impl FullyConnected {
    fn after(real_builds: usize) -> Self {
        Self {
            real_builds,
            builds: Cell::new(0),
        }
    }
}

impl GeometryProvider for FullyConnected {
    fn build(&self, sites: &[DVec2], real_count: usize, canvas: Rect) -> Tessellation {
        let tess = DelaunayProvider.build(sites, real_count, canvas);
        self.builds.set(self.builds.get() + 1);
        if self.builds.get() <= self.real_builds {
            return tess;
        }
        let n = tess.site_count();
        let polygons = (0..n).map(|i| tess.cell_polygon(i).map(|p| p.to_vec())).collect();
        let neighbors = (0..n).map(|i| (0..n).filter(|&j| j != i).collect()).collect();
        Tessellation::new(canvas, neighbors, polygons)
    }
}

fn strict_retries(retries: f64) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.level = LevelKind::Random;
    config.set("maxSeedRetries", retries).expect("known");
    config.set("balanceTolerance", 0.0).expect("known");
    config
}

#[test]
fn seeding_failure_is_reported_per_attempt() {
    let canvas = Rect::from_size(900.0, 600.0);
    let mut engine = GameEngine::with_provider(strict_retries(2.0), canvas, 11, FullyConnected::after(0));

    let outcome = engine.seed_balanced();
    assert!(!outcome.balanced);
    assert_eq!(outcome.warnings.len(), 3);
    assert!(matches!(outcome.warnings[0], EngineWarning::Seeding { attempt: 1, .. }));
    assert!(matches!(outcome.warnings[1], EngineWarning::Seeding { attempt: 2, .. }));
    assert!(matches!(outcome.warnings[2], EngineWarning::Unbalanced { attempts: 2, .. }));
    assert_eq!(outcome.areas, engine.color_areas());
    assert_eq!(outcome.areas.a, 0.0);
    assert_eq!(outcome.areas.b, 0.0);
}

#[test]
fn outcome_describes_the_layout_that_was_kept() {
    let canvas = Rect::from_size(900.0, 600.0);
    // The first attempt seeds normally and stays unbalanced at zero
    // tolerance; the second one cannot seed at all.
    let mut engine = GameEngine::with_provider(strict_retries(2.0), canvas, 11, FullyConnected::after(1));

    let outcome = engine.seed_balanced();
    assert!(!outcome.balanced);
    assert!(matches!(outcome.warnings[0], EngineWarning::Seeding { attempt: 2, .. }));
    let kept = engine.color_areas();
    assert_eq!(outcome.areas, kept);
    assert_eq!(kept.a + kept.b, 0.0, "the failed attempt left every cell uncolored");
    match outcome.warnings.last() {
        Some(EngineWarning::Unbalanced { imbalance, .. }) => assert_eq!(*imbalance, kept.imbalance()),
        other => panic!("expected an unbalanced warning, got {:?}", other),
    }
}

#[test]
fn harmony_uses_the_pitch_the_audio_hears() {
    let mut engine = small_engine(vec![
        DVec2::new(50.0, 50.0),
        DVec2::new(150.0, 150.0),
        DVec2::new(250.0, 50.0),
        DVec2::new(60.0, 160.0),
    ]);
    engine.set_param("harmonyMode", 1.0).expect("known");
    let gate = engine.harmony_gate().expect("harmony mode is on");
    for site in 0..4 {
        assert_eq!(gate.frequency(site), engine.cell_frequency(site), "site {}", site);
    }
}

#[test]
fn balanced_seeding_colors_both_sides() {
    let mut engine = GameEngine::new(EngineConfig::default(), Rect::from_size(900.0, 600.0), 5);
    let outcome = engine.seed_balanced();
    assert!(outcome.attempts >= 1 && outcome.attempts <= 50);
    if outcome.balanced {
        let tolerance = 0.05 * 900.0 * 600.0;
        assert!(outcome.areas.imbalance() <= tolerance);
    }
    assert!(outcome.areas.a > 0.0 || outcome.areas.b > 0.0);
}

#[test]
fn moving_a_site_rebuilds_the_tessellation() {
    let mut engine = small_engine(vec![
        DVec2::new(50.0, 50.0),
        DVec2::new(150.0, 150.0),
        DVec2::new(250.0, 50.0),
    ]);
    let before = engine.tessellation().visible_area(0);
    engine.tessellation();
    assert_eq!(engine.tessellation_builds(), 1, "unchanged sites reuse the cache");

    engine.move_site(0, DVec2::new(120.0, 60.0));
    let after = engine.tessellation().visible_area(0);
    assert_eq!(engine.tessellation_builds(), 2);
    assert!((after - before).abs() > 1.0, "cell area should follow the moved site");
}

#[test]
fn push_step_separates_crowded_sites() {
    let mut engine = small_engine(vec![DVec2::new(140.0, 100.0), DVec2::new(160.0, 100.0)]);
    let pushed = engine.push_sites();
    assert_eq!(pushed, 1);
    let gap = engine.sites()[0].distance(engine.sites()[1]);
    assert!(gap > 20.0, "gap only {}", gap);
}

#[test]
fn set_param_rejects_unknown_names() {
    let mut engine = small_engine(Vec::new());
    assert!(engine.set_param("pushRadius", 55.0).is_ok());
    assert_eq!(engine.config().push_radius, 55.0);
    assert!(engine.set_param("nope", 1.0).is_err());
}

// Four locked cells, two per color, so propagation leaves the map alone.
fn locked_board() -> GameEngine {
    let mut engine = small_engine(vec![
        DVec2::new(50.0, 50.0),
        DVec2::new(150.0, 150.0),
        DVec2::new(250.0, 50.0),
        DVec2::new(60.0, 160.0),
    ]);
    for (site, color) in [(0, Color::A), (1, Color::A), (2, Color::B), (3, Color::B)] {
        engine.set_cell_color(site, color);
        engine.set_cell_locked(site, true);
    }
    engine.set_active_color(Color::A);
    engine
}

#[test]
fn inactive_side_cannot_be_picked_up() {
    let mut engine = locked_board();
    let mut audio: Vec<AudioEvent> = Vec::new();
    let down = engine.pointer_down(DVec2::new(252.0, 51.0), 0.0, &mut audio);
    assert_eq!(down, PointerDown::Rejected(2));
    assert_eq!(engine.dragged_site(), None);
    assert!(audio.is_empty());
}

#[test]
fn drag_move_release_passes_the_turn() {
    let mut engine = locked_board();
    let mut audio: Vec<AudioEvent> = Vec::new();

    assert_eq!(engine.pointer_down(DVec2::new(50.0, 50.0), 0.0, &mut audio), PointerDown::Drag(0));
    assert!(audio
        .iter()
        .any(|e| matches!(e, AudioEvent::Tone(t) if t.site == 0)));

    let update = engine
        .pointer_move(DVec2::new(90.0, 50.0), &mut audio)
        .expect("drag in progress");
    assert!(!update.blocked);
    assert_eq!(update.handed_over, None);
    assert_eq!(engine.sites()[0], DVec2::new(90.0, 50.0));

    audio.clear();
    assert_eq!(engine.pointer_up(DVec2::new(90.0, 50.0), 0.0, &mut audio), Some(0));
    assert_eq!(engine.active_color(), Some(Color::B));
    assert!(audio.contains(&AudioEvent::Stop {
        site: 0,
        kind: ToneStop::Release
    }));
    let first_note = audio.iter().find_map(|e| match e {
        AudioEvent::Note(n) => Some(*n),
        _ => None,
    });
    let note = first_note.expect("release spreads notes");
    assert_eq!(note.site, 0);
    assert_eq!(note.start_offset_sec, 0.0);
    assert!(audio.iter().all(|e| match e {
        AudioEvent::Note(n) => engine.color(n.site) == Color::A,
        _ => true,
    }));

    let mut capture = FrameCapture::default();
    engine.render(0.01, &mut capture);
    let frame = capture.last.expect("frame drawn");
    assert_eq!(frame.cells.len(), 4);
    assert!(frame.cells.iter().any(|c| c.site == 0 && c.highlighted));
    assert!(frame.sites[0].dimmed, "A is waiting after the turn passed");
    assert!(!frame.sites[2].dimmed);
    assert!(frame.drag_link.is_none());
    assert!(!frame.fronts.is_empty());

    let later = engine.build_frame(100.0);
    assert!(later.cells.iter().all(|c| !c.highlighted));
}

#[test]
fn dragged_cell_changing_sides_ends_the_drag() {
    let mut engine = small_engine(vec![DVec2::new(50.0, 100.0), DVec2::new(200.0, 100.0)]);
    engine.set_cell_color(0, Color::A);
    engine.set_cell_color(1, Color::B);
    engine.set_cell_locked(1, true);
    engine.set_active_color(Color::A);
    let mut audio: Vec<AudioEvent> = Vec::new();

    assert_eq!(engine.pointer_down(DVec2::new(50.0, 100.0), 0.0, &mut audio), PointerDown::Drag(0));
    let update = engine
        .pointer_move(DVec2::new(60.0, 100.0), &mut audio)
        .expect("drag in progress");

    assert_eq!(update.handed_over, Some(Color::B));
    assert_eq!(engine.color(0), Color::B);
    assert_eq!(engine.active_color(), Some(Color::B));
    assert_eq!(engine.dragged_site(), None);
    assert!(audio.contains(&AudioEvent::Stop {
        site: 0,
        kind: ToneStop::Glide
    }));
    assert!(engine.pointer_move(DVec2::new(70.0, 100.0), &mut audio).is_none());
}

#[test]
fn drag_near_other_sites_is_slowed() {
    let mut engine = small_engine(vec![DVec2::new(100.0, 100.0), DVec2::new(140.0, 100.0)]);
    engine.set_param("pushRadius", 0.0).expect("known");
    engine.set_param("alternateMoves", 0.0).expect("known");
    let mut audio: Vec<AudioEvent> = Vec::new();

    // The target (100, 130) is 50 px from the other site.
    engine.pointer_down(DVec2::new(100.0, 100.0), 0.0, &mut audio);
    engine.pointer_move(DVec2::new(100.0, 130.0), &mut audio);
    let moved = engine.sites()[0] - DVec2::new(100.0, 100.0);
    assert!((moved.y - 6.0).abs() < 1e-9, "20% of 30 px, got {}", moved.y);
}

#[test]
fn slowdown_looks_at_the_pointer_target() {
    let mut engine = small_engine(vec![DVec2::new(100.0, 100.0), DVec2::new(140.0, 100.0)]);
    engine.set_param("pushRadius", 0.0).expect("known");
    engine.set_param("alternateMoves", 0.0).expect("known");
    let mut audio: Vec<AudioEvent> = Vec::new();

    // The site starts 40 px from its neighbor, but the target (100, 170) is
    // about 81 px away, so the drag follows the pointer at full speed.
    engine.pointer_down(DVec2::new(100.0, 100.0), 0.0, &mut audio);
    engine.pointer_move(DVec2::new(100.0, 170.0), &mut audio);
    let moved = engine.sites()[0] - DVec2::new(100.0, 100.0);
    assert!((moved.y - 70.0).abs() < 1e-9, "full 70 px, got {}", moved.y);
}

#[test]
fn click_on_cell_body_spreads_notes() {
    let mut engine = locked_board();
    let mut audio: Vec<AudioEvent> = Vec::new();
    match engine.pointer_down(DVec2::new(100.0, 40.0), 1.0, &mut audio) {
        PointerDown::Notes { cell, scheduled } => {
            assert!(scheduled >= 1);
            assert!(audio
                .iter()
                .any(|e| matches!(e, AudioEvent::Note(n) if n.site == cell)));
        }
        other => panic!("expected a note spread, got {:?}", other),
    }
    assert_eq!(
        engine.pointer_down(DVec2::new(-40.0, -40.0), 1.0, &mut audio),
        PointerDown::Miss
    );
}

#[test]
fn drag_link_points_at_largest_neighbor() {
    let mut engine = locked_board();
    let mut audio: Vec<AudioEvent> = Vec::new();
    engine.pointer_down(DVec2::new(50.0, 50.0), 0.0, &mut audio);
    let frame = engine.build_frame(0.0);
    let link = frame.drag_link.expect("dragging");
    assert_eq!(link.from, DVec2::new(50.0, 50.0));
    assert!(link.frequency_ratio.is_some());
}

#[test]
fn regenerate_and_settle_headless() {
    let mut engine = GameEngine::new(EngineConfig::default(), Rect::from_size(900.0, 600.0), 21);
    let seeds = engine.regenerate().expect("40 sites always have a disjoint seed");
    assert_ne!(seeds.a, seeds.b);
    assert!(engine.color(seeds.a).is_colored());

    let builds = engine.tessellation_builds();
    let report = engine.step();
    assert!(report.passes >= 1);
    assert!(engine.tessellation_builds() > builds, "push must force a rebuild");

    let f = engine.cell_frequency(seeds.a);
    assert!((50.0..=1200.0).contains(&f));

    let mut audio = NullAudio;
    let start = engine.sites()[seeds.a];
    let expected = if engine.color(seeds.a) == Color::A {
        PointerDown::Drag(seeds.a)
    } else {
        PointerDown::Rejected(seeds.a)
    };
    assert_eq!(engine.pointer_down(start, 0.0, &mut audio), expected);
}

#[test]
fn fill_blend_darkens_large_cells() {
    let small = FillBlend::from_area_ratio(Color::A, 0.0, 0.1);
    let large = FillBlend::from_area_ratio(Color::B, 0.5, 0.1);
    assert_eq!(small.rgb(), [0xFF, 0x8B, 0xA7]);
    assert_eq!(large.rgb(), [0, 0, 0]);
    let half = FillBlend::from_area_ratio(Color::Uncolored, 0.25, 0.5);
    assert_eq!(half.rgb(), [128, 128, 128]);
}
