//! The engine context: owns the sites, the cached tessellation and the
//! territory map, and sequences rebuild → weigh → push → propagate.

use crate::config::EngineConfig;
use crate::constants::{DRAG_PICK_RADIUS, FREQ_FALLBACK_HZ};
use crate::graph::CellGraph;
use crate::harmony::{FrequencyMap, HarmonyGate};
use crate::levels;
use crate::polygon::Rect;
use crate::render::FrontSegment;
use crate::repulsion::{clamp_to_bounds, relax};
use crate::tessellation::{default_border_sites, DelaunayProvider, GeometryCache, GeometryProvider, Tessellation};
use crate::territory::{Color, ColorAreas, PropagationReport, SeedPair, TerritoryError, TerritoryMap};
use crate::weights::{compute_weights, pin_dragged_weight};
use fnv::{FnvHashMap, FnvHashSet};
use glam::DVec2;
use instant::Instant;
use rand::prelude::*;
use thiserror::Error;

/// Soft failures the engine reports instead of raising.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineWarning {
    #[error("seeding attempt {attempt} failed: {source}")]
    Seeding {
        attempt: usize,
        source: TerritoryError,
    },
    #[error(
        "territories still unbalanced after {attempts} attempts \
         (|A - B| = {imbalance:.1}, tolerance {tolerance:.1})"
    )]
    Unbalanced {
        attempts: usize,
        imbalance: f64,
        tolerance: f64,
    },
}

/// Result of [`GameEngine::seed_balanced`]. When `balanced` is false the
/// engine keeps the last attempt's layout.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedOutcome {
    pub attempts: usize,
    pub balanced: bool,
    pub areas: ColorAreas,
    pub warnings: Vec<EngineWarning>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DragState {
    pub site: usize,
    pub start: DVec2,
    pub successful: bool,
}

/// Time window in which a cell is drawn highlighted (audio clock seconds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Highlight {
    pub start: f64,
    pub end: f64,
}

/// Owns every piece of mutable game state.
///
/// Site positions are the only thing that moves. Any method that moves sites
/// invalidates the geometry cache, and every method that reads neighbors or
/// areas goes through the cache, so a stale tessellation is never observed.
///
/// Typical usage:
/// - Construct with `GameEngine::new(config, canvas, seed)`
/// - Call `seed_balanced()` (or `regenerate()`) to lay out a level
/// - Feed pointer events through `pointer_down/move/up`
/// - Call `build_frame(now)` or `render(now, sink)` once per frame
pub struct GameEngine<P: GeometryProvider = DelaunayProvider> {
    pub(crate) config: EngineConfig,
    pub(crate) sites: Vec<DVec2>,
    pub(crate) geometry: GeometryCache<P>,
    pub(crate) territory: TerritoryMap,
    pub(crate) drag: Option<DragState>,
    pub(crate) tones: FnvHashSet<usize>,
    pub(crate) highlights: FnvHashMap<usize, Highlight>,
    rng: StdRng,
}

impl GameEngine<DelaunayProvider> {
    pub fn new(config: EngineConfig, canvas: Rect, seed: u64) -> Self {
        Self::with_provider(config, canvas, seed, DelaunayProvider)
    }
}

impl<P: GeometryProvider> GameEngine<P> {
    pub fn with_provider(config: EngineConfig, canvas: Rect, seed: u64, provider: P) -> Self {
        Self {
            config,
            sites: Vec::new(),
            geometry: GeometryCache::new(provider, canvas, default_border_sites(canvas)),
            territory: TerritoryMap::new(0),
            drag: None,
            tones: FnvHashSet::default(),
            highlights: FnvHashMap::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Set a tunable by name. Invalidates the tessellation, since
    /// `useBorderSites` changes the geometry.
    pub fn set_param(&mut self, name: &str, value: f64) -> Result<(), crate::ConfigError> {
        self.config.set(name, value)?;
        self.geometry.invalidate();
        Ok(())
    }

    pub fn canvas(&self) -> Rect {
        self.geometry.canvas()
    }

    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    pub fn territory(&self) -> &TerritoryMap {
        &self.territory
    }

    pub fn color(&self, site: usize) -> Color {
        self.territory.color(site)
    }

    pub fn active_color(&self) -> Option<Color> {
        self.territory.active_color()
    }

    pub fn dragged_site(&self) -> Option<usize> {
        self.drag.map(|d| d.site)
    }

    /// Nearest site within the pick radius of `pos`.
    pub fn site_at(&self, pos: DVec2) -> Option<usize> {
        self.sites
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance(pos)))
            .filter(|(_, d)| *d <= DRAG_PICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Paint one cell directly, bypassing propagation.
    pub fn set_cell_color(&mut self, site: usize, color: Color) {
        self.territory.set_color(site, color);
    }

    /// Give the turn to `color`; ignored for `Uncolored`.
    pub fn set_active_color(&mut self, color: Color) {
        self.territory.set_active_color(color);
    }

    pub fn set_cell_locked(&mut self, site: usize, locked: bool) {
        self.territory.set_locked(site, locked);
    }

    /// Replace the whole site set. Colors are reset, drags and tones dropped.
    pub fn set_sites(&mut self, sites: Vec<DVec2>) {
        self.territory.reset(sites.len());
        self.sites = sites;
        self.drag = None;
        self.tones.clear();
        self.highlights.clear();
        self.geometry.invalidate();
    }

    pub fn move_site(&mut self, site: usize, position: DVec2) {
        if let Some(p) = self.sites.get_mut(site) {
            *p = position;
            self.geometry.invalidate();
        }
    }

    /// Current tessellation, rebuilt first if any site moved since the last call.
    pub fn tessellation(&mut self) -> &Tessellation {
        self.geometry.get(&self.sites, self.config.use_border_sites)
    }

    /// Number of tessellation rebuilds so far.
    pub fn tessellation_builds(&self) -> u64 {
        self.geometry.builds()
    }

    pub fn frequency_map(&self) -> FrequencyMap {
        FrequencyMap::new(self.config.freq_threshold)
    }

    pub fn cell_frequency(&mut self, site: usize) -> f64 {
        let map = self.frequency_map();
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        cell_pitch(tess, &map, site)
    }

    /// Harmony predicate/gate for the current layout, when harmony mode is on.
    pub fn harmony_gate(&mut self) -> Option<HarmonyGate> {
        if !self.config.harmony_mode {
            return None;
        }
        let map = self.frequency_map();
        let influence = self.config.harmony_influence;
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        Some(HarmonyGate::from_tessellation(tess, map, influence))
    }

    /// Fresh sites from the configured level generator, unclumped with the
    /// unweighted solver. Colors are cleared.
    pub fn generate_layout(&mut self) {
        let canvas = self.canvas();
        let sites = levels::generate(
            self.config.level,
            &mut self.rng,
            self.config.num_cells,
            &canvas,
            crate::constants::LEVEL_MARGIN,
            self.config.spread_factor,
        );
        self.set_sites(sites);
        self.unclump();
    }

    /// Repeated unweighted relaxation to remove overlaps after a regenerate.
    pub fn unclump(&mut self) {
        let passes = self.config.relax_passes(self.sites.len());
        let params = self.config.push_params();
        let canvas = self.canvas();
        for _ in 0..passes {
            relax(&mut self.sites, None, &params);
            clamp_to_bounds(&mut self.sites, &canvas, self.config.boundary_margin);
        }
        self.geometry.invalidate();
    }

    pub fn seed_territories(&mut self) -> Result<SeedPair, TerritoryError> {
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        let result = self.territory.seed(tess);
        if let Err(e) = &result {
            log::warn!("[territory] seeding aborted: {}", e);
        }
        result
    }

    pub fn propagate_colors(&mut self, iterations: usize) -> PropagationReport {
        let gate = self.harmony_gate();
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        self.territory.propagate(tess, iterations, gate.as_ref())
    }

    /// New layout, seeds and propagation in one go (no balance check).
    pub fn regenerate(&mut self) -> Result<SeedPair, TerritoryError> {
        self.generate_layout();
        let seeds = self.seed_territories()?;
        let report = self.propagate_colors(self.config.color_propagation_iterations);
        log::info!(
            "[engine] regenerated {} sites, seeds A={} B={}, {} recolors in {} passes",
            self.sites.len(),
            seeds.a,
            seeds.b,
            report.recolored,
            report.passes
        );
        Ok(seeds)
    }

    /// Regenerate until both colors own roughly the same area.
    ///
    /// Each attempt lays out fresh sites, seeds and propagates, then compares
    /// the per-color visible areas against `balance_tolerance` of the canvas.
    /// Gives up after `max_seed_retries` attempts and keeps the last layout;
    /// the returned areas always describe that layout, even when its seeding failed.
    pub fn seed_balanced(&mut self) -> SeedOutcome {
        let retries = self.config.max_seed_retries.max(1);
        let tolerance = self.config.balance_tolerance * self.canvas().area();
        let iterations = self.config.color_propagation_iterations;
        let mut warnings = Vec::new();
        let mut areas = ColorAreas::default();

        for attempt in 1..=retries {
            self.generate_layout();
            if let Err(source) = self.seed_territories() {
                warnings.push(EngineWarning::Seeding { attempt, source });
                areas = self.color_areas();
                continue;
            }
            self.propagate_colors(iterations);
            areas = self.color_areas();
            if areas.imbalance() <= tolerance {
                log::info!(
                    "[engine] balanced layout after {} attempt(s): A={:.0} B={:.0}",
                    attempt,
                    areas.a,
                    areas.b
                );
                return SeedOutcome {
                    attempts: attempt,
                    balanced: true,
                    areas,
                    warnings,
                };
            }
        }

        let warning = EngineWarning::Unbalanced {
            attempts: retries,
            imbalance: areas.imbalance(),
            tolerance,
        };
        log::warn!("[engine] {}", warning);
        warnings.push(warning);
        SeedOutcome {
            attempts: retries,
            balanced: false,
            areas,
            warnings,
        }
    }

    pub fn color_areas(&mut self) -> ColorAreas {
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        self.territory.color_areas(tess)
    }

    /// Weights for the repulsion solver; a dragged site keeps its own area.
    pub fn compute_weights(&mut self) -> Vec<f64> {
        let gate = self.harmony_gate();
        let iterations = self.config.weight_iterations;
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        let mut weights = compute_weights(tess, &self.territory, gate.as_ref(), iterations);
        if let Some(drag) = self.drag {
            pin_dragged_weight(&mut weights, tess, drag.site);
        }
        weights
    }

    /// One weighted relaxation pass followed by boundary clamping.
    /// Returns the number of pairs pushed.
    pub fn push_sites(&mut self) -> usize {
        let started = Instant::now();
        let weights = self.compute_weights();
        let params = self.config.push_params();
        let canvas = self.canvas();
        let pushed = relax(&mut self.sites, Some(&weights), &params);
        clamp_to_bounds(&mut self.sites, &canvas, self.config.boundary_margin);
        self.geometry.invalidate();
        log::debug!("[relax] pushed {} pairs in {:?}", pushed, started.elapsed());
        pushed
    }

    /// Per-frame settle: push overlapping sites apart, then let colors follow.
    pub fn step(&mut self) -> PropagationReport {
        self.push_sites();
        self.propagate_colors(self.config.color_propagation_iterations)
    }

    /// Territory borders with the length of the boundary each pair shares.
    pub fn front_lines(&mut self) -> Vec<FrontSegment> {
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        self.territory
            .front_lines(tess)
            .into_iter()
            .map(|edge| FrontSegment {
                edge,
                length: tess.shared_boundary_length(edge.a, edge.b),
            })
            .collect()
    }
}

/// Pitch of one cell; cells without a polygon get the fallback pitch.
pub(crate) fn cell_pitch(tess: &Tessellation, map: &FrequencyMap, site: usize) -> f64 {
    if site >= tess.site_count() {
        return FREQ_FALLBACK_HZ;
    }
    let area = tess.cell_polygon(site).map(|_| tess.visible_area(site));
    map.cell_frequency(area, tess.canvas().area())
}
