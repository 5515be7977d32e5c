//! Read-only view of a cell adjacency graph.
//!
//! The territory and weight engines only need neighbor lists and visible
//! areas, so they are written against [`CellGraph`] rather than a concrete
//! tessellation. [`crate::Tessellation`] implements it for the live game;
//! [`AdjacencyGraph`] is a hand-built graph for tools and tests.

use smallvec::SmallVec;

pub type NeighborList = SmallVec<[usize; 8]>;

pub trait CellGraph {
    /// Number of real (colorable) sites. Border sites are never counted.
    fn site_count(&self) -> usize;

    /// Neighbors of `site` among the real sites, ascending.
    fn neighbors(&self, site: usize) -> &[usize];

    /// Cell area clipped to the canvas; 0 for missing or degenerate cells.
    fn visible_area(&self, site: usize) -> f64;

    /// Site indices sorted by visible area, largest first. Ties keep index order.
    fn ranked_by_area(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.site_count()).collect();
        order.sort_by(|&a, &b| self.visible_area(b).total_cmp(&self.visible_area(a)));
        order
    }

    /// Neighbor with the largest visible area (first one wins ties).
    fn largest_neighbor(&self, site: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &nb in self.neighbors(site) {
            let area = self.visible_area(nb);
            match best {
                Some((_, a)) if area <= a => {}
                _ => best = Some((nb, area)),
            }
        }
        best.map(|(nb, _)| nb)
    }

    fn are_neighbors(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }
}

/// Explicit neighbor lists plus areas.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyGraph {
    neighbors: Vec<NeighborList>,
    areas: Vec<f64>,
}

impl AdjacencyGraph {
    /// Build from per-site areas and undirected edges. Out-of-range endpoints
    /// and self loops are ignored.
    pub fn new(areas: Vec<f64>, edges: &[(usize, usize)]) -> Self {
        let n = areas.len();
        let mut neighbors = vec![NeighborList::new(); n];
        for &(a, b) in edges {
            if a == b || a >= n || b >= n {
                continue;
            }
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        let areas = areas
            .into_iter()
            .map(|a| if a.is_finite() { a.max(0.0) } else { 0.0 })
            .collect();
        Self { neighbors, areas }
    }

    /// Simple path `0 - 1 - ... - n-1`.
    pub fn path(areas: Vec<f64>) -> Self {
        let edges: Vec<(usize, usize)> = (1..areas.len()).map(|i| (i - 1, i)).collect();
        Self::new(areas, &edges)
    }
}

impl CellGraph for AdjacencyGraph {
    fn site_count(&self) -> usize {
        self.areas.len()
    }

    fn neighbors(&self, site: usize) -> &[usize] {
        self.neighbors.get(site).map(|l| l.as_slice()).unwrap_or(&[])
    }

    fn visible_area(&self, site: usize) -> f64 {
        self.areas.get(site).copied().unwrap_or(0.0)
    }
}
