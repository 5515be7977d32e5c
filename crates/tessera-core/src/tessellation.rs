//! Delaunay/Voronoi tessellation of the site set.
//!
//! A [`Tessellation`] is a snapshot: it is built from one site list and never
//! mutated. Any site move makes it stale; the engine drops its cached copy and
//! asks the [`GeometryProvider`] for a new one before reading neighbors or
//! areas again.

use crate::constants::{BORDER_SITE_OFFSET, BORDER_SITE_SPACING};
use crate::graph::{CellGraph, NeighborList};
use crate::polygon::{
    clip_half_plane, clip_to_convex_polygon, clip_to_rect, point_in_polygon, polygon_area,
    polygon_perimeter, Rect,
};
use glam::DVec2;

/// Builds a tessellation for `sites`. The first `real_count` sites are the
/// colorable ones; any trailing sites are auxiliary border sites that shape the
/// cells but are dropped from the result.
pub trait GeometryProvider {
    fn build(&self, sites: &[DVec2], real_count: usize, canvas: Rect) -> Tessellation;
}

/// Neighbor relation plus clipped cell polygons for the real sites.
#[derive(Clone, Debug)]
pub struct Tessellation {
    canvas: Rect,
    neighbors: Vec<NeighborList>,
    polygons: Vec<Option<Vec<DVec2>>>,
    visible_areas: Vec<f64>,
}

impl Tessellation {
    /// Assemble from raw provider output. Neighbor lists are sorted,
    /// deduplicated and restricted to `0..polygons.len()`.
    pub fn new(canvas: Rect, neighbors: Vec<NeighborList>, polygons: Vec<Option<Vec<DVec2>>>) -> Self {
        let n = polygons.len();
        let mut neighbors = neighbors;
        neighbors.resize(n, NeighborList::new());
        for (i, list) in neighbors.iter_mut().enumerate() {
            list.retain(|nb| *nb < n && *nb != i);
            list.sort_unstable();
            list.dedup();
        }
        let polygons: Vec<Option<Vec<DVec2>>> = polygons
            .into_iter()
            .map(|p| p.filter(|p| p.len() >= 3))
            .collect();
        let visible_areas = polygons
            .iter()
            .map(|p| match p {
                Some(poly) => polygon_area(&clip_to_rect(poly, &canvas)),
                None => 0.0,
            })
            .collect();
        Self {
            canvas,
            neighbors,
            polygons,
            visible_areas,
        }
    }

    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    pub fn cell_polygon(&self, site: usize) -> Option<&[DVec2]> {
        self.polygons.get(site).and_then(|p| p.as_deref())
    }

    /// Visible area as a fraction of the canvas, clamped to `[0, 1]`.
    pub fn area_ratio(&self, site: usize) -> f64 {
        let canvas_area = self.canvas.area();
        if canvas_area <= 0.0 {
            return 0.0;
        }
        (self.visible_area(site) / canvas_area).clamp(0.0, 1.0)
    }

    /// Length of the boundary two cells share, 0 when they do not touch.
    ///
    /// The intersection of two adjacent convex cells collapses onto their
    /// common edge, so half its perimeter is the edge length.
    pub fn shared_boundary_length(&self, a: usize, b: usize) -> f64 {
        let (Some(pa), Some(pb)) = (self.cell_polygon(a), self.cell_polygon(b)) else {
            return 0.0;
        };
        let pa = clip_to_rect(pa, &self.canvas);
        let pb = clip_to_rect(pb, &self.canvas);
        let overlap = clip_to_convex_polygon(&pa, &pb);
        if overlap.len() < 2 {
            return 0.0;
        }
        polygon_perimeter(&overlap) * 0.5
    }

    /// Cell containing `pt`, if any.
    pub fn find_cell(&self, pt: DVec2) -> Option<usize> {
        self.polygons
            .iter()
            .position(|p| p.as_deref().is_some_and(|poly| point_in_polygon(pt, poly)))
    }
}

impl CellGraph for Tessellation {
    fn site_count(&self) -> usize {
        self.polygons.len()
    }

    fn neighbors(&self, site: usize) -> &[usize] {
        self.neighbors.get(site).map(|l| l.as_slice()).unwrap_or(&[])
    }

    fn visible_area(&self, site: usize) -> f64 {
        self.visible_areas.get(site).copied().unwrap_or(0.0)
    }
}

/// Lazily rebuilt tessellation for an engine's site list.
///
/// Every site mutation must call [`GeometryCache::invalidate`]; the next
/// [`GeometryCache::get`] rebuilds from the current positions.
#[derive(Clone, Debug)]
pub struct GeometryCache<P: GeometryProvider> {
    provider: P,
    canvas: Rect,
    border: Vec<DVec2>,
    current: Option<Tessellation>,
    builds: u64,
}

impl<P: GeometryProvider> GeometryCache<P> {
    pub fn new(provider: P, canvas: Rect, border: Vec<DVec2>) -> Self {
        Self {
            provider,
            canvas,
            border,
            current: None,
            builds: 0,
        }
    }

    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn is_stale(&self) -> bool {
        self.current.is_none()
    }

    /// How many times the provider has been asked for a tessellation.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    pub fn get(&mut self, sites: &[DVec2], with_border: bool) -> &Tessellation {
        let tess = match self.current.take() {
            Some(t) => t,
            None => {
                self.builds += 1;
                if with_border && !self.border.is_empty() {
                    let mut all = Vec::with_capacity(sites.len() + self.border.len());
                    all.extend_from_slice(sites);
                    all.extend_from_slice(&self.border);
                    self.provider.build(&all, sites.len(), self.canvas)
                } else {
                    self.provider.build(sites, sites.len(), self.canvas)
                }
            }
        };
        self.current.insert(tess)
    }
}

/// Default provider: `delaunator` triangulation, cells built by clipping the
/// canvas with the bisector of every Delaunay neighbor.
#[derive(Clone, Copy, Debug, Default)]
pub struct DelaunayProvider;

impl GeometryProvider for DelaunayProvider {
    fn build(&self, sites: &[DVec2], real_count: usize, canvas: Rect) -> Tessellation {
        let real_count = real_count.min(sites.len());
        let all_neighbors = delaunay_neighbors(sites);

        let polygons = (0..real_count)
            .map(|i| voronoi_cell(sites, i, &all_neighbors[i], canvas))
            .collect::<Vec<_>>();
        let neighbors = all_neighbors.into_iter().take(real_count).collect();
        Tessellation::new(canvas, neighbors, polygons)
    }
}

fn voronoi_cell(sites: &[DVec2], i: usize, neighbors: &[usize], canvas: Rect) -> Option<Vec<DVec2>> {
    // Coincident duplicates never make it into a triangle.
    if neighbors.is_empty() && sites.len() > 1 {
        return None;
    }
    let site = sites[i];
    let mut poly = canvas.to_polygon();
    for &nb in neighbors {
        let dir = sites[nb] - site;
        if dir.length_squared() <= f64::EPSILON {
            continue;
        }
        poly = clip_half_plane(&poly, (site + sites[nb]) * 0.5, dir);
        if poly.len() < 3 {
            return None;
        }
    }
    Some(poly)
}

/// Symmetric Delaunay adjacency over all sites (real and border).
fn delaunay_neighbors(sites: &[DVec2]) -> Vec<NeighborList> {
    let n = sites.len();
    let mut sets = vec![NeighborList::new(); n];
    if n < 2 {
        return sets;
    }
    let points: Vec<delaunator::Point> = sites
        .iter()
        .map(|p| delaunator::Point { x: p.x, y: p.y })
        .collect();
    let triangulation = delaunator::triangulate(&points);

    if triangulation.triangles.is_empty() {
        collinear_chain(sites, &mut sets);
    } else {
        for tri in triangulation.triangles.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                sets[a].push(b);
                sets[b].push(a);
            }
        }
    }
    for list in &mut sets {
        list.sort_unstable();
        list.dedup();
    }
    sets
}

/// All sites on one line: link consecutive distinct sites along it.
fn collinear_chain(sites: &[DVec2], sets: &mut [NeighborList]) {
    let origin = sites[0];
    let far = sites
        .iter()
        .copied()
        .max_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
        .unwrap_or(origin);
    let axis = far - origin;
    if axis.length_squared() <= f64::EPSILON {
        return;
    }
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| (sites[a] - origin).dot(axis).total_cmp(&(sites[b] - origin).dot(axis)));
    order.dedup_by(|a, b| sites[*a].distance_squared(sites[*b]) <= f64::EPSILON);
    for pair in order.windows(2) {
        sets[pair[0]].push(pair[1]);
        sets[pair[1]].push(pair[0]);
    }
}

/// Ring of auxiliary sites `offset` outside the canvas, every `spacing` units.
pub fn border_sites(canvas: Rect, spacing: f64, offset: f64) -> Vec<DVec2> {
    let mut out = Vec::new();
    if spacing <= 0.0 {
        return out;
    }
    let (x0, x1) = (canvas.min.x - offset, canvas.max.x + offset);
    let (y0, y1) = (canvas.min.y - offset, canvas.max.y + offset);
    let mut x = x0;
    while x <= x1 {
        out.push(DVec2::new(x, y0));
        out.push(DVec2::new(x, y1));
        x += spacing;
    }
    let mut y = y0;
    while y <= y1 {
        out.push(DVec2::new(x0, y));
        out.push(DVec2::new(x1, y));
        y += spacing;
    }
    out
}

/// [`border_sites`] with the default spacing and offset.
pub fn default_border_sites(canvas: Rect) -> Vec<DVec2> {
    border_sites(canvas, BORDER_SITE_SPACING, BORDER_SITE_OFFSET)
}
