//! Frame assembly: turns the engine state into a [`Frame`] for a renderer.

use crate::engine::{cell_pitch, GameEngine};
use crate::graph::CellGraph;
use crate::polygon::centroid;
use crate::render::{CellFrame, DragLink, FillBlend, Frame, RenderSink, SiteMarker};
use crate::tessellation::GeometryProvider;

impl<P: GeometryProvider> GameEngine<P> {
    /// Describe the current state at audio time `now`. Expired highlights are
    /// dropped as a side effect.
    pub fn build_frame(&mut self, now: f64) -> Frame {
        self.highlights.retain(|_, h| h.end >= now);
        let fronts = self.front_lines();

        let map = self.frequency_map();
        let threshold = self.config.color_threshold;
        let show_ratios = self.config.show_frequency_ratios;
        let dim_inactive = self.config.alternate_moves;
        let active = self.territory.active_color();
        let dragged = self.drag.map(|d| d.site);

        let tess = self.geometry.get(&self.sites, self.config.use_border_sites);

        let mut cells = Vec::with_capacity(tess.site_count());
        for site in 0..tess.site_count() {
            let Some(poly) = tess.cell_polygon(site) else {
                continue;
            };
            let color = self.territory.color(site);
            let highlighted = self
                .highlights
                .get(&site)
                .is_some_and(|h| now >= h.start && now <= h.end);
            cells.push(CellFrame {
                site,
                polygon: poly.to_vec(),
                fill: FillBlend::from_area_ratio(color, tess.area_ratio(site), threshold),
                highlighted,
                centroid: centroid(poly).unwrap_or(self.sites[site]),
                frequency_hz: cell_pitch(tess, &map, site),
            });
        }

        let sites = self
            .sites
            .iter()
            .enumerate()
            .map(|(site, &position)| SiteMarker {
                site,
                position,
                dimmed: dim_inactive && active.is_some_and(|c| c != self.territory.color(site)),
            })
            .collect();

        let drag_link = dragged.and_then(|d| {
            let nb = tess.largest_neighbor(d)?;
            let frequency_ratio = show_ratios.then(|| {
                let (fd, fnb) = (cell_pitch(tess, &map, d), cell_pitch(tess, &map, nb));
                if fnb > 0.0 {
                    fd / fnb
                } else {
                    0.0
                }
            });
            Some(DragLink {
                from: self.sites[d],
                to: self.sites[nb],
                frequency_ratio,
            })
        });

        Frame {
            cells,
            sites,
            drag_link,
            fronts,
        }
    }

    pub fn render<R: RenderSink>(&mut self, now: f64, sink: &mut R) {
        let frame = self.build_frame(now);
        sink.draw(&frame);
    }
}
