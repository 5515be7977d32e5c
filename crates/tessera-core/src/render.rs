//! Per-frame description handed to a renderer.

use crate::constants::{COLOR_A_RGB, COLOR_B_RGB};
use crate::territory::{Color, FrontEdge};
use glam::DVec2;

/// Territory color plus a luminance in `[0, 1]` derived from the cell size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillBlend {
    pub color: Color,
    pub luminance: f64,
}

impl FillBlend {
    /// Small cells are bright, cells above `threshold` of the canvas are black.
    pub fn from_area_ratio(color: Color, ratio: f64, threshold: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        let luminance = if threshold > 0.0 && ratio <= threshold {
            1.0 - ratio / threshold
        } else {
            0.0
        };
        Self { color, luminance }
    }

    /// Palette color darkened by the luminance; grey for uncolored cells.
    pub fn rgb(&self) -> [u8; 3] {
        let base = match self.color {
            Color::A => COLOR_A_RGB,
            Color::B => COLOR_B_RGB,
            Color::Uncolored => [255, 255, 255],
        };
        base.map(|c| (c as f64 * self.luminance).round().clamp(0.0, 255.0) as u8)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellFrame {
    pub site: usize,
    pub polygon: Vec<DVec2>,
    pub fill: FillBlend,
    pub highlighted: bool,
    pub centroid: DVec2,
    pub frequency_hz: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiteMarker {
    pub site: usize,
    pub position: DVec2,
    /// Alternating mode: this site belongs to the side that is not moving.
    pub dimmed: bool,
}

/// Line from the dragged site to its largest neighbor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragLink {
    pub from: DVec2,
    pub to: DVec2,
    /// Pitch ratio of the two cells, when frequency ratios are shown.
    pub frequency_ratio: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontSegment {
    pub edge: FrontEdge,
    pub length: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub cells: Vec<CellFrame>,
    pub sites: Vec<SiteMarker>,
    pub drag_link: Option<DragLink>,
    pub fronts: Vec<FrontSegment>,
}

pub trait RenderSink {
    fn draw(&mut self, frame: &Frame);
}

/// Keeps the most recent frame; used by tests and snapshots.
#[derive(Clone, Debug, Default)]
pub struct FrameCapture {
    pub last: Option<Frame>,
    pub frames: usize,
}

impl RenderSink for FrameCapture {
    fn draw(&mut self, frame: &Frame) {
        self.last = Some(frame.clone());
        self.frames += 1;
    }
}
