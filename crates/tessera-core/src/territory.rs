//! Two-color territory layer.
//!
//! Every real site carries a [`CellState`]. Seeding colors the largest cell
//! with [`Color::A`] and the largest cell not touching it with [`Color::B`];
//! propagation then lets each cell adopt the color of its largest colored
//! neighbor, processing big cells first so their fronts win.

use crate::graph::CellGraph;
use crate::harmony::HarmonyGate;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    Uncolored,
    A,
    B,
}

impl Color {
    pub fn is_colored(self) -> bool {
        self != Color::Uncolored
    }

    /// The competing color; `Uncolored` stays `Uncolored`.
    pub fn other(self) -> Color {
        match self {
            Color::A => Color::B,
            Color::B => Color::A,
            Color::Uncolored => Color::Uncolored,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellState {
    pub color: Color,
    /// A locked cell keeps its color; it can still hand it to neighbors.
    pub locked: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TerritoryError {
    #[error("need at least two sites to seed territories, have {0}")]
    TooFewSites(usize),
    #[error("every candidate for the second seed touches the largest cell {0}")]
    NoDisjointSeed(usize),
}

/// The two seed cells chosen by [`TerritoryMap::seed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedPair {
    pub a: usize,
    pub b: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub passes: usize,
    pub recolored: usize,
    /// False when the pass budget ran out while cells were still changing.
    pub converged: bool,
}

/// Total visible area owned by each color.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorAreas {
    pub a: f64,
    pub b: f64,
    pub uncolored: f64,
}

impl ColorAreas {
    pub fn imbalance(&self) -> f64 {
        (self.a - self.b).abs()
    }
}

/// An edge between two adjacent cells of different colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontEdge {
    pub a: usize,
    pub b: usize,
}

#[derive(Clone, Debug, Default)]
pub struct TerritoryMap {
    cells: Vec<CellState>,
    active: Option<Color>,
}

impl TerritoryMap {
    /// `site_count` uncolored, unlocked cells and no active color.
    pub fn new(site_count: usize) -> Self {
        Self {
            cells: vec![CellState::default(); site_count],
            active: None,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn color(&self, site: usize) -> Color {
        self.cells.get(site).map(|c| c.color).unwrap_or_default()
    }

    pub fn set_color(&mut self, site: usize, color: Color) {
        if let Some(c) = self.cells.get_mut(site) {
            c.color = color;
        }
    }

    pub fn is_locked(&self, site: usize) -> bool {
        self.cells.get(site).is_some_and(|c| c.locked)
    }

    pub fn set_locked(&mut self, site: usize, locked: bool) {
        if let Some(c) = self.cells.get_mut(site) {
            c.locked = locked;
        }
    }

    /// Resize to `site_count` and clear every color and lock. The active color
    /// survives so an ongoing alternating game keeps its turn.
    pub fn reset(&mut self, site_count: usize) {
        self.cells.clear();
        self.cells.resize(site_count, CellState::default());
    }

    pub fn active_color(&self) -> Option<Color> {
        self.active
    }

    pub fn set_active_color(&mut self, color: Color) {
        if color.is_colored() {
            self.active = Some(color);
        }
    }

    /// Hand the turn to the other color (A when none was set).
    pub fn toggle_active_color(&mut self) -> Color {
        let next = match self.active {
            Some(c) => c.other(),
            None => Color::A,
        };
        self.active = Some(next);
        next
    }

    /// Clear all colors and plant the two seed territories.
    ///
    /// On error nothing is colored and the caller decides whether to retry
    /// with another layout.
    pub fn seed<G: CellGraph>(&mut self, graph: &G) -> Result<SeedPair, TerritoryError> {
        let n = graph.site_count();
        self.reset(n);
        if n < 2 {
            return Err(TerritoryError::TooFewSites(n));
        }
        let ranked = graph.ranked_by_area();
        let big1 = ranked[0];
        let big2 = ranked[1..]
            .iter()
            .copied()
            .find(|&c| !graph.are_neighbors(big1, c))
            .ok_or(TerritoryError::NoDisjointSeed(big1))?;

        self.cells[big1].color = Color::A;
        self.cells[big2].color = Color::B;
        if self.active.is_none() {
            self.active = Some(Color::A);
        }
        log::debug!("[territory] seeds A={} B={}", big1, big2);
        Ok(SeedPair { a: big1, b: big2 })
    }

    /// Largest-colored-neighbor relaxation, at most `iterations` passes.
    pub fn propagate<G: CellGraph>(
        &mut self,
        graph: &G,
        iterations: usize,
        gate: Option<&HarmonyGate>,
    ) -> PropagationReport {
        let n = graph.site_count().min(self.cells.len());
        let mut report = PropagationReport::default();
        while report.passes < iterations {
            report.passes += 1;
            let mut changed = 0;
            for i in graph.ranked_by_area() {
                if i >= n || self.cells[i].locked {
                    continue;
                }
                let Some(j) = self.largest_colored_neighbor(graph, i) else {
                    continue;
                };
                let donor = self.cells[j].color;
                if donor == self.cells[i].color {
                    continue;
                }
                if gate.is_some_and(|g| !g.allows(j, i)) {
                    continue;
                }
                self.cells[i].color = donor;
                changed += 1;
            }
            report.recolored += changed;
            log::debug!("[territory] pass {} recolored {}", report.passes, changed);
            if changed == 0 {
                report.converged = true;
                break;
            }
        }
        report
    }

    fn largest_colored_neighbor<G: CellGraph>(&self, graph: &G, site: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &nb in graph.neighbors(site) {
            if !self.color(nb).is_colored() {
                continue;
            }
            let area = graph.visible_area(nb);
            match best {
                Some((_, a)) if area <= a => {}
                _ => best = Some((nb, area)),
            }
        }
        best.map(|(nb, _)| nb)
    }

    pub fn color_areas<G: CellGraph>(&self, graph: &G) -> ColorAreas {
        let mut areas = ColorAreas::default();
        for i in 0..graph.site_count() {
            let a = graph.visible_area(i);
            match self.color(i) {
                Color::A => areas.a += a,
                Color::B => areas.b += a,
                Color::Uncolored => areas.uncolored += a,
            }
        }
        areas
    }

    /// Adjacent pairs whose colors differ (both colored), each listed once.
    pub fn front_lines<G: CellGraph>(&self, graph: &G) -> Vec<FrontEdge> {
        let mut out = Vec::new();
        for a in 0..graph.site_count() {
            let ca = self.color(a);
            if !ca.is_colored() {
                continue;
            }
            for &b in graph.neighbors(a) {
                let cb = self.color(b);
                if b > a && cb.is_colored() && cb != ca {
                    out.push(FrontEdge { a, b });
                }
            }
        }
        out
    }
}
