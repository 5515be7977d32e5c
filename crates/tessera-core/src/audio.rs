//! Audio boundary: requests the engine hands to a synth, and the neighborhood
//! walks that decide which cells sound.
//!
//! The engine never produces samples. It tells an [`AudioSink`] which cell
//! should sound, when, at what pitch and how loud; envelopes and oscillators
//! belong to the sink.

use crate::constants::DISTANCE_DELAY_SEC_PER_PX;
use crate::graph::CellGraph;
use crate::territory::TerritoryMap;
use fnv::FnvHashSet;
use glam::DVec2;
use std::collections::VecDeque;

/// One-shot note for a cell.
///
/// - `start_offset_sec`: delay from "now" at which the note starts
/// - `frequency_hz`: pitch from the area → frequency map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteRequest {
    pub site: usize,
    pub start_offset_sec: f64,
    pub frequency_hz: f64,
}

/// Continuous tone for a cell while a drag is in progress. `volume` already
/// includes the global drag tone volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneRequest {
    pub site: usize,
    pub volume: f64,
    pub frequency_hz: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneStop {
    /// Regular release.
    Release,
    /// Pitch drops away; used when the dragged cell changes sides.
    Glide,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioEvent {
    Note(NoteRequest),
    Tone(ToneRequest),
    Stop { site: usize, kind: ToneStop },
}

pub trait AudioSink {
    fn schedule_note(&mut self, note: NoteRequest);
    fn set_tone(&mut self, tone: ToneRequest);
    fn stop_tone(&mut self, site: usize, kind: ToneStop);
}

/// Collects events for later playback, mirroring a scheduler's out-queue.
impl AudioSink for Vec<AudioEvent> {
    fn schedule_note(&mut self, note: NoteRequest) {
        self.push(AudioEvent::Note(note));
    }

    fn set_tone(&mut self, tone: ToneRequest) {
        self.push(AudioEvent::Tone(tone));
    }

    fn stop_tone(&mut self, site: usize, kind: ToneStop) {
        self.push(AudioEvent::Stop { site, kind });
    }
}

/// Sink that drops everything; handy for headless relaxation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn schedule_note(&mut self, _note: NoteRequest) {}
    fn set_tone(&mut self, _tone: ToneRequest) {}
    fn stop_tone(&mut self, _site: usize, _kind: ToneStop) {}
}

/// Breadth-first rings around `start`, depth 1 being `start` itself.
/// Returns `(site, depth)` in visit order.
pub fn neighborhood<G: CellGraph>(graph: &G, start: usize, max_depth: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    if start >= graph.site_count() || max_depth == 0 {
        return out;
    }
    let mut visited = FnvHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back((start, 1));
    while let Some((site, depth)) = queue.pop_front() {
        out.push((site, depth));
        if depth >= max_depth {
            continue;
        }
        for &nb in graph.neighbors(site) {
            if visited.insert(nb) {
                queue.push_back((nb, depth + 1));
            }
        }
    }
    out
}

/// Note schedule for a click or release at `pointer` in the cell `start`.
///
/// Rings are `step_sec` apart; within a ring cells closer to the pointer go
/// first with a small distance delay. Only cells sharing the start cell's
/// color sound. Returns `(site, start_offset_sec)` in schedule order.
pub fn plan_note_spread<G: CellGraph>(
    graph: &G,
    territory: &TerritoryMap,
    sites: &[DVec2],
    start: usize,
    pointer: DVec2,
    max_depth: usize,
    step_sec: f64,
) -> Vec<(usize, f64)> {
    let start_color = territory.color(start);
    let mut rings: Vec<Vec<(usize, f64)>> = vec![Vec::new(); max_depth + 1];
    for (site, depth) in neighborhood(graph, start, max_depth) {
        let dist = sites.get(site).map(|p| p.distance(pointer)).unwrap_or(0.0);
        rings[depth].push((site, dist));
    }

    let mut plan = Vec::new();
    for (depth, ring) in rings.iter_mut().enumerate().skip(1) {
        ring.sort_by(|a, b| a.1.total_cmp(&b.1));
        for &(site, dist) in ring.iter() {
            if territory.color(site) != start_color {
                continue;
            }
            let offset = (depth - 1) as f64 * step_sec + dist * DISTANCE_DELAY_SEC_PER_PX;
            plan.push((site, offset));
        }
    }
    plan
}

/// Cells that keep sounding while `dragged` is held: its depth-limited
/// neighborhood, plus the largest cell in it other than `dragged`.
pub fn drag_tone_cells<G: CellGraph>(
    graph: &G,
    dragged: usize,
    max_depth: usize,
) -> (FnvHashSet<usize>, Option<usize>) {
    let mut keep = FnvHashSet::default();
    let mut largest: Option<(usize, f64)> = None;
    for (site, _) in neighborhood(graph, dragged, max_depth) {
        keep.insert(site);
        if site == dragged {
            continue;
        }
        let area = graph.visible_area(site);
        match largest {
            Some((_, a)) if area <= a => {}
            _ => largest = Some((site, area)),
        }
    }
    (keep, largest.map(|(s, _)| s))
}
