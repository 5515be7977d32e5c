//! Area → pitch mapping and the consonance test built on top of it.

use crate::constants::{
    FREQ_FALLBACK_HZ, FREQ_MAX_HZ, FREQ_MIN_HZ, HARMONY_MAX_TERM, HARMONY_TOLERANCE,
};
use crate::engine::cell_pitch;
use crate::graph::CellGraph;
use crate::tessellation::Tessellation;

/// Piecewise-linear area → frequency curve.
///
/// Ratios up to `threshold` sweep linearly from `FREQ_MAX_HZ` (empty cell)
/// down to `FREQ_MIN_HZ`; anything larger sits at `FREQ_MIN_HZ`.
#[derive(Clone, Copy, Debug)]
pub struct FrequencyMap {
    pub threshold: f64,
}

impl FrequencyMap {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn frequency_of(&self, area_ratio: f64) -> f64 {
        let ratio = if area_ratio.is_finite() {
            area_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.threshold <= 0.0 || ratio > self.threshold {
            return FREQ_MIN_HZ;
        }
        let t = ratio / self.threshold;
        FREQ_MAX_HZ - (FREQ_MAX_HZ - FREQ_MIN_HZ) * t
    }

    /// Frequency of a cell from its visible area; `None` area means no polygon.
    pub fn cell_frequency(&self, visible_area: Option<f64>, canvas_area: f64) -> f64 {
        match visible_area {
            Some(area) if canvas_area > 0.0 => self.frequency_of(area / canvas_area),
            _ => FREQ_FALLBACK_HZ,
        }
    }
}

/// True when `freq_a / freq_b` lies within `HARMONY_TOLERANCE` of some `p/q`
/// with `p, q` in `1..=HARMONY_MAX_TERM`.
pub fn is_harmonic(freq_a: f64, freq_b: f64) -> bool {
    if !(freq_a.is_finite() && freq_b.is_finite()) || freq_a <= 0.0 || freq_b <= 0.0 {
        return false;
    }
    let ratio = freq_a / freq_b;
    (1..=HARMONY_MAX_TERM).any(|p| {
        (1..=HARMONY_MAX_TERM).any(|q| (ratio - p as f64 / q as f64).abs() <= HARMONY_TOLERANCE)
    })
}

/// Per-site frequencies and areas for harmony-aware propagation.
///
/// Acts both as the pair predicate for weight spreading and as the gate on
/// territory transfers.
#[derive(Clone, Debug)]
pub struct HarmonyGate {
    frequencies: Vec<f64>,
    areas: Vec<f64>,
    influence: f64,
}

impl HarmonyGate {
    pub fn new(frequencies: Vec<f64>, areas: Vec<f64>, influence: f64) -> Self {
        Self {
            frequencies,
            areas,
            influence: influence.clamp(0.0, 1.0),
        }
    }

    /// Derive frequencies from a graph's visible areas relative to `canvas_area`.
    pub fn from_graph<G: CellGraph>(
        graph: &G,
        map: FrequencyMap,
        canvas_area: f64,
        influence: f64,
    ) -> Self {
        let n = graph.site_count();
        let areas: Vec<f64> = (0..n).map(|i| graph.visible_area(i)).collect();
        let frequencies = areas
            .iter()
            .map(|&a| {
                let ratio = if canvas_area > 0.0 { a / canvas_area } else { 0.0 };
                map.frequency_of(ratio)
            })
            .collect();
        Self::new(frequencies, areas, influence)
    }

    /// Same pitches the audio side hears: cells without a polygon get the
    /// fallback frequency instead of the empty-cell one.
    pub fn from_tessellation(tess: &Tessellation, map: FrequencyMap, influence: f64) -> Self {
        let n = tess.site_count();
        let areas = (0..n).map(|i| tess.visible_area(i)).collect();
        let frequencies = (0..n).map(|i| cell_pitch(tess, &map, i)).collect();
        Self::new(frequencies, areas, influence)
    }

    pub fn influence(&self) -> f64 {
        self.influence
    }

    pub fn frequency(&self, site: usize) -> f64 {
        self.frequencies.get(site).copied().unwrap_or(FREQ_FALLBACK_HZ)
    }

    pub fn harmonic(&self, a: usize, b: usize) -> bool {
        is_harmonic(self.frequency(a), self.frequency(b))
    }

    /// May `to` take the color of `from`? Only consonant pairs are gated:
    /// they need `area(from) > area(to) * (1 - influence)`.
    pub fn allows(&self, from: usize, to: usize) -> bool {
        if !self.harmonic(from, to) {
            return true;
        }
        let area_from = self.areas.get(from).copied().unwrap_or(0.0);
        let area_to = self.areas.get(to).copied().unwrap_or(0.0);
        area_from > area_to * (1.0 - self.influence)
    }
}
