//! Pointer handling: picking and dragging sites, alternating turns, and the
//! audio requests those gestures produce.

use crate::audio::{drag_tone_cells, plan_note_spread, AudioSink, NoteRequest, ToneRequest, ToneStop};
use crate::constants::{
    DRAG_BLOCKED_EPS, DRAG_MOVE_THRESHOLD, DRAG_SLOW_FACTOR, DRAG_TONE_DEPTH,
    LARGEST_NEIGHBOR_TONE_VOLUME, NOTE_DURATION_SEC, NOTE_STOP_PAD_SEC, REPEL_THRESHOLD,
};
use crate::engine::{cell_pitch, DragState, GameEngine, Highlight};
use crate::tessellation::GeometryProvider;
use crate::territory::{Color, PropagationReport};
use glam::DVec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerDown {
    /// A site was picked up.
    Drag(usize),
    /// Click on a cell body: a note spread started from `cell`.
    Notes { cell: usize, scheduled: usize },
    /// Alternating mode: the site belongs to the side that is not moving.
    Rejected(usize),
    Miss,
}

/// What one pointer move did to the layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragUpdate {
    pub site: usize,
    pub pushed: usize,
    /// The solver pinned the dragged site in place; it was put back.
    pub blocked: bool,
    /// Alternating mode: the dragged cell changed sides and the turn went to this color.
    pub handed_over: Option<Color>,
    pub report: PropagationReport,
}

impl<P: GeometryProvider> GameEngine<P> {
    pub fn pointer_down<A: AudioSink>(&mut self, pos: DVec2, now: f64, audio: &mut A) -> PointerDown {
        if let Some(site) = self.site_at(pos) {
            let color = self.territory.color(site);
            if self.config.alternate_moves && self.territory.active_color().is_some_and(|c| c != color) {
                log::debug!("[pointer] site {} is not on the moving side", site);
                return PointerDown::Rejected(site);
            }
            self.drag = Some(DragState {
                site,
                start: self.sites[site],
                successful: false,
            });
            log::info!("[pointer] begin drag on site {}", site);
            self.update_drag_tones(audio);
            return PointerDown::Drag(site);
        }

        let hit = self
            .geometry
            .get(&self.sites, self.config.use_border_sites)
            .find_cell(pos);
        match hit {
            Some(cell) => {
                let scheduled = self.spread_notes(cell, pos, now, audio);
                PointerDown::Notes { cell, scheduled }
            }
            None => PointerDown::Miss,
        }
    }

    /// Drag the held site toward `pos`, then settle the layout around it.
    /// Returns `None` when nothing is being dragged.
    pub fn pointer_move<A: AudioSink>(&mut self, pos: DVec2, audio: &mut A) -> Option<DragUpdate> {
        let mut drag = self.drag?;
        let site = drag.site;
        let current = self.sites[site];

        let crowded = self
            .sites
            .iter()
            .enumerate()
            .any(|(i, p)| i != site && p.distance(pos) < REPEL_THRESHOLD);
        let target = if crowded {
            current + (pos - current) * DRAG_SLOW_FACTOR
        } else {
            pos
        };
        if target.distance(drag.start) > DRAG_MOVE_THRESHOLD {
            drag.successful = true;
        }
        self.drag = Some(drag);
        self.move_site(site, target);

        let pushed = self.push_sites();
        let blocked = self.sites[site].distance(current) < DRAG_BLOCKED_EPS;
        if blocked {
            self.move_site(site, current);
        }

        let before = self.territory.color(site);
        let report = self.propagate_colors(self.config.color_propagation_iterations);
        self.update_drag_tones(audio);

        let after = self.territory.color(site);
        let mut handed_over = None;
        if self.config.alternate_moves && after != before && after.is_colored() {
            audio.stop_tone(site, ToneStop::Glide);
            for other in self.tones.drain().filter(|&s| s != site) {
                audio.stop_tone(other, ToneStop::Release);
            }
            self.drag = None;
            self.territory.set_active_color(after);
            handed_over = Some(after);
            log::info!("[pointer] site {} changed sides, turn goes to {:?}", site, after);
        }

        Some(DragUpdate {
            site,
            pushed,
            blocked,
            handed_over,
            report,
        })
    }

    /// Release the held site. Returns the released site, if any.
    pub fn pointer_up<A: AudioSink>(&mut self, pos: DVec2, now: f64, audio: &mut A) -> Option<usize> {
        let drag = self.drag.take()?;
        if self.config.alternate_moves && drag.successful {
            let next = self.territory.toggle_active_color();
            log::info!("[pointer] turn passes to {:?}", next);
        }
        for site in self.tones.drain() {
            audio.stop_tone(site, ToneStop::Release);
        }
        self.spread_notes(drag.site, pos, now, audio);
        log::info!("[pointer] end drag on site {}", drag.site);
        Some(drag.site)
    }

    /// Schedule notes rippling out from `start` and mark their cells for
    /// highlighting. Returns the number of notes scheduled.
    pub fn spread_notes<A: AudioSink>(&mut self, start: usize, pointer: DVec2, now: f64, audio: &mut A) -> usize {
        let map = self.frequency_map();
        let depth = self.config.spread_depth;
        let step = self.config.spread_step_sec();
        let hold = NOTE_DURATION_SEC + self.config.note_release_sec + NOTE_STOP_PAD_SEC;

        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        let plan = plan_note_spread(tess, &self.territory, &self.sites, start, pointer, depth, step);
        for &(site, offset) in &plan {
            audio.schedule_note(NoteRequest {
                site,
                start_offset_sec: offset,
                frequency_hz: cell_pitch(tess, &map, site),
            });
            self.highlights.insert(
                site,
                Highlight {
                    start: now + offset,
                    end: now + offset + hold,
                },
            );
        }
        log::debug!("[audio] spread {} notes from cell {}", plan.len(), start);
        plan.len()
    }

    /// Retune the held tones to the current layout and silence cells that
    /// left the dragged cell's neighborhood.
    pub fn update_drag_tones<A: AudioSink>(&mut self, audio: &mut A) {
        let Some(drag) = self.drag else {
            return;
        };
        let map = self.frequency_map();
        let volume = self.config.drag_tone_volume;
        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);
        let (keep, largest) = drag_tone_cells(tess, drag.site, DRAG_TONE_DEPTH);

        let stale: Vec<usize> = self.tones.iter().copied().filter(|s| !keep.contains(s)).collect();
        for site in stale {
            audio.stop_tone(site, ToneStop::Release);
            self.tones.remove(&site);
        }

        audio.set_tone(ToneRequest {
            site: drag.site,
            volume,
            frequency_hz: cell_pitch(tess, &map, drag.site),
        });
        self.tones.insert(drag.site);
        if let Some(nb) = largest {
            audio.set_tone(ToneRequest {
                site: nb,
                volume: volume * LARGEST_NEIGHBOR_TONE_VOLUME,
                frequency_hz: cell_pitch(tess, &map, nb),
            });
            self.tones.insert(nb);
        }
    }
}
