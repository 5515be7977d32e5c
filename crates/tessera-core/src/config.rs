//! Engine tunables, addressable by their slider names.

use crate::constants::*;
use crate::levels::LevelKind;
use crate::repulsion::PushParams;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    #[error("parameter `{name}` must be finite, got {value}")]
    NotFinite { name: String, value: f64 },
    #[error("unknown level `{0}` (expected random, symmetric or regular)")]
    UnknownLevel(String),
}

/// Runtime parameters for the engine.
///
/// Ratios and influences live in `[0, 1]`, counts are at least 1; `set`
/// clamps into those domains instead of rejecting.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub push_radius: f64,
    pub push_factor: f64,
    pub size_influence: f64,
    pub boundary_margin: f64,
    pub harmony_influence: f64,
    pub color_propagation_iterations: usize,
    pub balance_tolerance: f64,
    pub max_seed_retries: usize,

    pub num_cells: usize,
    pub level: LevelKind,
    pub spread_factor: f64,
    pub color_threshold: f64,
    pub freq_threshold: f64,
    pub spread_time: f64,
    pub spread_depth: usize,
    pub drag_tone_volume: f64,
    pub weight_iterations: usize,
    pub note_release_sec: f64,
    pub alternate_moves: bool,
    pub harmony_mode: bool,
    pub use_border_sites: bool,
    pub show_frequency_ratios: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            push_radius: DEFAULT_PUSH_RADIUS,
            push_factor: DEFAULT_PUSH_FACTOR,
            size_influence: DEFAULT_SIZE_INFLUENCE,
            boundary_margin: DEFAULT_BOUNDARY_MARGIN,
            harmony_influence: DEFAULT_HARMONY_INFLUENCE,
            color_propagation_iterations: DEFAULT_PROPAGATION_ITERATIONS,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
            max_seed_retries: DEFAULT_MAX_SEED_RETRIES,
            num_cells: DEFAULT_NUM_CELLS,
            level: LevelKind::default(),
            spread_factor: DEFAULT_SPREAD_FACTOR,
            color_threshold: DEFAULT_COLOR_THRESHOLD,
            freq_threshold: DEFAULT_FREQ_THRESHOLD,
            spread_time: DEFAULT_SPREAD_TIME,
            spread_depth: DEFAULT_SPREAD_DEPTH,
            drag_tone_volume: DEFAULT_DRAG_TONE_VOLUME,
            weight_iterations: DEFAULT_WEIGHT_ITERATIONS,
            note_release_sec: DEFAULT_NOTE_RELEASE_SEC,
            alternate_moves: true,
            harmony_mode: false,
            use_border_sites: true,
            show_frequency_ratios: true,
        }
    }
}

/// Every name accepted by [`EngineConfig::set`] and [`EngineConfig::get`].
pub const PARAMETER_NAMES: &[&str] = &[
    "pushRadius",
    "pushFactor",
    "sizeInfluence",
    "boundaryMargin",
    "harmonyInfluence",
    "colorPropagationIterations",
    "balanceTolerance",
    "maxSeedRetries",
    "numCells",
    "spreadFactor",
    "colorThreshold",
    "freqThreshold",
    "spreadTime",
    "spreadDepth",
    "dragToneVolume",
    "weightIterations",
    "noteRelease",
    "alternateMoves",
    "harmonyMode",
    "useBorderSites",
    "showFrequencyRatios",
];

fn unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn count(v: f64) -> usize {
    v.round().max(1.0) as usize
}

impl EngineConfig {
    /// Set a parameter by name. Booleans take 0/1 (any non-zero is true).
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite {
                name: name.to_string(),
                value,
            });
        }
        match name {
            "pushRadius" => self.push_radius = value.max(0.0),
            "pushFactor" => self.push_factor = value.max(0.0),
            "sizeInfluence" => self.size_influence = unit(value),
            "boundaryMargin" => self.boundary_margin = value.max(0.0),
            "harmonyInfluence" => self.harmony_influence = unit(value),
            "colorPropagationIterations" => self.color_propagation_iterations = count(value),
            "balanceTolerance" => self.balance_tolerance = unit(value),
            "maxSeedRetries" => self.max_seed_retries = count(value),
            "numCells" => self.num_cells = count(value),
            "spreadFactor" => self.spread_factor = unit(value),
            "colorThreshold" => self.color_threshold = unit(value),
            "freqThreshold" => self.freq_threshold = unit(value),
            "spreadTime" => self.spread_time = unit(value),
            "spreadDepth" => self.spread_depth = count(value),
            "dragToneVolume" => self.drag_tone_volume = unit(value),
            "weightIterations" => self.weight_iterations = count(value),
            "noteRelease" => self.note_release_sec = value.max(0.0),
            "alternateMoves" => self.alternate_moves = value != 0.0,
            "harmonyMode" => self.harmony_mode = value != 0.0,
            "useBorderSites" => self.use_border_sites = value != 0.0,
            "showFrequencyRatios" => self.show_frequency_ratios = value != 0.0,
            _ => return Err(ConfigError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let v = match name {
            "pushRadius" => self.push_radius,
            "pushFactor" => self.push_factor,
            "sizeInfluence" => self.size_influence,
            "boundaryMargin" => self.boundary_margin,
            "harmonyInfluence" => self.harmony_influence,
            "colorPropagationIterations" => self.color_propagation_iterations as f64,
            "balanceTolerance" => self.balance_tolerance,
            "maxSeedRetries" => self.max_seed_retries as f64,
            "numCells" => self.num_cells as f64,
            "spreadFactor" => self.spread_factor,
            "colorThreshold" => self.color_threshold,
            "freqThreshold" => self.freq_threshold,
            "spreadTime" => self.spread_time,
            "spreadDepth" => self.spread_depth as f64,
            "dragToneVolume" => self.drag_tone_volume,
            "weightIterations" => self.weight_iterations as f64,
            "noteRelease" => self.note_release_sec,
            "alternateMoves" => flag(self.alternate_moves),
            "harmonyMode" => flag(self.harmony_mode),
            "useBorderSites" => flag(self.use_border_sites),
            "showFrequencyRatios" => flag(self.show_frequency_ratios),
            _ => return None,
        };
        Some(v)
    }

    pub fn push_params(&self) -> PushParams {
        PushParams {
            push_radius: self.push_radius,
            push_factor: self.push_factor,
            size_influence: self.size_influence,
        }
    }

    /// Delay between BFS rings of a note spread: 50 ms * 20^spread_time.
    pub fn spread_step_sec(&self) -> f64 {
        SPREAD_TIME_BASE_MS * SPREAD_TIME_RANGE.powf(unit(self.spread_time)) / 1000.0
    }

    /// Unclump passes after regenerating `site_count` sites.
    pub fn relax_passes(&self, site_count: usize) -> usize {
        if site_count > RELAX_LARGE_SITE_COUNT {
            RELAX_PASSES_LARGE
        } else {
            RELAX_PASSES_SMALL
        }
    }
}
