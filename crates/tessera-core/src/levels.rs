//! Different ways of throwing sites at a canvas.

use crate::config::ConfigError;
use crate::polygon::Rect;
use glam::DVec2;
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LevelKind {
    Random,
    /// Mirrored about the vertical center line.
    #[default]
    Symmetric,
    Regular,
}

impl std::str::FromStr for LevelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(LevelKind::Random),
            "symmetric" => Ok(LevelKind::Symmetric),
            "regular" => Ok(LevelKind::Regular),
            _ => Err(ConfigError::UnknownLevel(s.to_string())),
        }
    }
}

/// Skewed unit sample: `spread_factor` 0 is uniform, values towards 1 bunch
/// samples at the far end.
fn skewed<R: Rng>(rng: &mut R, spread_factor: f64) -> f64 {
    let exponent = (1.0 - spread_factor.clamp(0.0, 1.0)).max(f64::EPSILON);
    rng.gen::<f64>().powf(exponent)
}

pub fn random_level<R: Rng>(
    rng: &mut R,
    count: usize,
    canvas: &Rect,
    margin: f64,
    spread_factor: f64,
) -> Vec<DVec2> {
    let span = DVec2::new(
        (canvas.width() - 2.0 * margin).max(0.0),
        (canvas.height() - 2.0 * margin).max(0.0),
    );
    (0..count)
        .map(|_| {
            let rx = skewed(rng, spread_factor);
            let ry = skewed(rng, spread_factor);
            canvas.min + DVec2::splat(margin) + DVec2::new(rx * span.x, ry * span.y)
        })
        .collect()
}

/// Sites on the left half mirrored to the right. An odd count puts the last
/// site on the axis.
pub fn symmetric_level<R: Rng>(
    rng: &mut R,
    count: usize,
    canvas: &Rect,
    margin: f64,
    spread_factor: f64,
) -> Vec<DVec2> {
    let half_w = canvas.width() * 0.5;
    let span = DVec2::new(
        (half_w - 2.0 * margin).max(0.0),
        (canvas.height() - 2.0 * margin).max(0.0),
    );
    let mut out = Vec::with_capacity(count);
    for _ in 0..count / 2 {
        let rx = skewed(rng, spread_factor);
        let ry = skewed(rng, spread_factor);
        let x = canvas.min.x + margin + rx * span.x;
        let y = canvas.min.y + margin + ry * span.y;
        out.push(DVec2::new(x, y));
        out.push(DVec2::new(canvas.max.x - (x - canvas.min.x), y));
    }
    if count % 2 == 1 {
        let ry = skewed(rng, spread_factor);
        out.push(DVec2::new(
            canvas.min.x + half_w,
            canvas.min.y + margin + ry * span.y,
        ));
    }
    out
}

/// Square grid with cell centers, truncated to `count` sites.
pub fn regular_level(count: usize, canvas: &Rect, margin: f64) -> Vec<DVec2> {
    if count == 0 || canvas.width() <= 0.0 || canvas.height() <= 0.0 {
        return Vec::new();
    }
    let (w, h) = (canvas.width(), canvas.height());
    let cols = ((count as f64 * w / h).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols);
    let spacing = ((w - 2.0 * margin) / cols as f64).min((h - 2.0 * margin) / rows as f64);
    let spacing = spacing.max(0.0);
    let mut out = Vec::with_capacity(count);
    'grid: for r in 0..rows {
        for c in 0..cols {
            if out.len() == count {
                break 'grid;
            }
            out.push(DVec2::new(
                canvas.min.x + margin + (c as f64 + 0.5) * spacing,
                canvas.min.y + margin + (r as f64 + 0.5) * spacing,
            ));
        }
    }
    out
}

pub fn generate<R: Rng>(
    kind: LevelKind,
    rng: &mut R,
    count: usize,
    canvas: &Rect,
    margin: f64,
    spread_factor: f64,
) -> Vec<DVec2> {
    match kind {
        LevelKind::Random => random_level(rng, count, canvas, margin, spread_factor),
        LevelKind::Symmetric => symmetric_level(rng, count, canvas, margin, spread_factor),
        LevelKind::Regular => regular_level(count, canvas, margin),
    }
}
