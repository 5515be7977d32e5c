//! Pure polygon helpers used by the tessellation and the territory layer.
//!
//! Polygons are plain vertex slices, implicitly closed (the last vertex
//! connects back to the first). Nothing here allocates state beyond the
//! returned vertex lists.

use glam::DVec2;

/// Axis-aligned rectangle, `min` is the top-left corner in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Rectangle spanning `[0, width] x [0, height]`.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(DVec2::ZERO, DVec2::new(width, height))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        (self.width() * self.height()).max(0.0)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Corner list, clockwise in screen space (y down).
    pub fn to_polygon(&self) -> Vec<DVec2> {
        vec![
            self.min,
            DVec2::new(self.max.x, self.min.y),
            self.max,
            DVec2::new(self.min.x, self.max.y),
        ]
    }

    /// Shrink by `margin` on every side; collapses to the center when too small.
    pub fn inset(&self, margin: f64) -> Rect {
        let center = (self.min + self.max) * 0.5;
        let min = (self.min + DVec2::splat(margin)).min(center);
        let max = (self.max - DVec2::splat(margin)).max(center);
        Rect::new(min, max)
    }
}

#[inline]
fn cross(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

fn signed_area(poly: &[DVec2]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (i, p) in poly.iter().enumerate() {
        let q = poly[(i + 1) % poly.len()];
        acc += p.x * q.y - q.x * p.y;
    }
    acc * 0.5
}

/// Unsigned shoelace area. Fewer than three vertices yields 0.
pub fn polygon_area(poly: &[DVec2]) -> f64 {
    signed_area(poly).abs()
}

pub fn polygon_perimeter(poly: &[DVec2]) -> f64 {
    if poly.len() < 2 {
        return 0.0;
    }
    poly.iter()
        .enumerate()
        .map(|(i, p)| p.distance(poly[(i + 1) % poly.len()]))
        .sum()
}

/// Arithmetic mean of the vertices (label anchor, not the center of mass).
pub fn centroid(poly: &[DVec2]) -> Option<DVec2> {
    if poly.is_empty() {
        return None;
    }
    let sum: DVec2 = poly.iter().copied().sum();
    Some(sum / poly.len() as f64)
}

/// Ray-crossing test; works for any simple polygon.
pub fn point_in_polygon(pt: DVec2, poly: &[DVec2]) -> bool {
    let mut inside = false;
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi.y > pt.y) != (pj.y > pt.y) {
            let x_cross = (pj.x - pi.x) * (pt.y - pi.y) / (pj.y - pi.y) + pi.x;
            if pt.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// One Sutherland–Hodgman pass. `inside` decides vertex membership,
/// `intersect` returns the crossing point on the segment `prev -> cur`.
fn clip_pass(
    poly: &[DVec2],
    inside: impl Fn(DVec2) -> bool,
    intersect: impl Fn(DVec2, DVec2) -> DVec2,
) -> Vec<DVec2> {
    let mut out = Vec::with_capacity(poly.len() + 2);
    let Some(&last) = poly.last() else {
        return out;
    };
    let mut prev = last;
    let mut prev_inside = inside(prev);
    for &cur in poly {
        let cur_inside = inside(cur);
        match (prev_inside, cur_inside) {
            (true, true) => out.push(cur),
            (true, false) => out.push(intersect(prev, cur)),
            (false, true) => {
                out.push(intersect(prev, cur));
                out.push(cur);
            }
            (false, false) => {}
        }
        prev = cur;
        prev_inside = cur_inside;
    }
    out
}

#[derive(Clone, Copy, Debug)]
enum RectEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl RectEdge {
    const ORDER: [RectEdge; 4] = [RectEdge::Left, RectEdge::Right, RectEdge::Top, RectEdge::Bottom];

    fn inside(self, r: &Rect, p: DVec2) -> bool {
        match self {
            RectEdge::Left => p.x >= r.min.x,
            RectEdge::Right => p.x <= r.max.x,
            RectEdge::Top => p.y >= r.min.y,
            RectEdge::Bottom => p.y <= r.max.y,
        }
    }

    fn intersect(self, r: &Rect, a: DVec2, b: DVec2) -> DVec2 {
        match self {
            RectEdge::Left | RectEdge::Right => {
                let x = if matches!(self, RectEdge::Left) { r.min.x } else { r.max.x };
                let t = (x - a.x) / (b.x - a.x);
                DVec2::new(x, a.y + t * (b.y - a.y))
            }
            RectEdge::Top | RectEdge::Bottom => {
                let y = if matches!(self, RectEdge::Top) { r.min.y } else { r.max.y };
                let t = (y - a.y) / (b.y - a.y);
                DVec2::new(a.x + t * (b.x - a.x), y)
            }
        }
    }
}

/// Clip against an axis-aligned rectangle: left, right, top, bottom in that order.
/// Returns an empty list when nothing lies inside.
pub fn clip_to_rect(poly: &[DVec2], rect: &Rect) -> Vec<DVec2> {
    let mut out = poly.to_vec();
    for edge in RectEdge::ORDER {
        if out.is_empty() {
            break;
        }
        out = clip_pass(&out, |p| edge.inside(rect, p), |a, b| edge.intersect(rect, a, b));
    }
    out
}

/// Keep the part of `poly` on the side of the line through `origin` where
/// `(p - origin) . normal <= 0`.
pub fn clip_half_plane(poly: &[DVec2], origin: DVec2, normal: DVec2) -> Vec<DVec2> {
    let dist = |p: DVec2| (p - origin).dot(normal);
    clip_pass(
        poly,
        |p| dist(p) <= 0.0,
        |a, b| {
            let (da, db) = (dist(a), dist(b));
            let t = da / (da - db);
            a + (b - a) * t
        },
    )
}

/// Clip `subject` against a convex `clip` polygon of either winding.
///
/// Clip edges are visited in input order; a vertex is inside an edge when the
/// cross product of the edge direction with the vertex offset has the sign of
/// the clip polygon's orientation. Boundary points count as inside, so two
/// adjacent cells intersect in their shared edge.
pub fn clip_to_convex_polygon(subject: &[DVec2], clip: &[DVec2]) -> Vec<DVec2> {
    if clip.len() < 3 {
        return Vec::new();
    }
    let orientation = signed_area(clip).signum();
    if orientation == 0.0 {
        return Vec::new();
    }
    let mut out = subject.to_vec();
    for (i, &a) in clip.iter().enumerate() {
        if out.is_empty() {
            break;
        }
        let b = clip[(i + 1) % clip.len()];
        let edge = b - a;
        let side = |p: DVec2| cross(edge, p - a) * orientation;
        out = clip_pass(
            &out,
            |p| side(p) >= -1e-9,
            |p, q| {
                let (sp, sq) = (side(p), side(q));
                let denom = sp - sq;
                if denom.abs() < f64::EPSILON {
                    return p;
                }
                p + (q - p) * (sp / denom)
            },
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_area_tracks_winding() {
        let ccw = [DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)];
        let cw = [DVec2::ZERO, DVec2::new(0.0, 1.0), DVec2::new(1.0, 0.0)];
        assert!(signed_area(&ccw) > 0.0);
        assert!(signed_area(&cw) < 0.0);
    }

    #[test]
    fn inset_never_inverts() {
        let r = Rect::from_size(10.0, 10.0).inset(8.0);
        assert!(r.width() >= 0.0 && r.height() >= 0.0);
    }
}
