//! Pairwise push-apart relaxation of site positions.

use crate::constants::{MIN_PUSH_DISTANCE, SIZE_INFLUENCE_EXACT_EPS};
use crate::polygon::Rect;
use glam::DVec2;

/// Tuning for one relaxation pass.
///
/// - `push_radius`: pairs closer than this repel
/// - `push_factor`: fraction of the overlap resolved per pass
/// - `size_influence`: 0 ignores weights, 1 lets only the lighter site move
#[derive(Clone, Copy, Debug)]
pub struct PushParams {
    pub push_radius: f64,
    pub push_factor: f64,
    pub size_influence: f64,
}

/// Push every close pair apart once.
///
/// Without weights each site of a pair takes half the displacement. With
/// weights, effective immovability is `1 + (w - 1) * size_influence` and the
/// displacement is split inversely to it. At `size_influence == 1` a pair with
/// unequal weights moves only its lighter site, by the full overlap.
///
/// Returns the number of pairs that were pushed.
pub fn relax(sites: &mut [DVec2], weights: Option<&[f64]>, params: &PushParams) -> usize {
    let radius = params.push_radius;
    let influence = params.size_influence.clamp(0.0, 1.0);
    let winner_take_all = (influence - 1.0).abs() < SIZE_INFLUENCE_EXACT_EPS;
    let mut pushed = 0;

    for i in 0..sites.len() {
        for j in (i + 1)..sites.len() {
            let delta = sites[j] - sites[i];
            let dist = delta.length();
            if dist >= radius || dist <= MIN_PUSH_DISTANCE {
                continue;
            }
            pushed += 1;
            let overlap = (radius - dist) * params.push_factor;
            let dir = delta / dist;
            let half = overlap * 0.5;

            let Some(w) = weights else {
                sites[i] -= dir * half;
                sites[j] += dir * half;
                continue;
            };
            let w_i = w.get(i).copied().unwrap_or(0.0);
            let w_j = w.get(j).copied().unwrap_or(0.0);

            if winner_take_all && w_i != w_j {
                if w_i > w_j {
                    sites[j] += dir * overlap;
                } else {
                    sites[i] -= dir * overlap;
                }
                continue;
            }

            let eff_i = 1.0 + (w_i - 1.0) * influence;
            let eff_j = 1.0 + (w_j - 1.0) * influence;
            let total = eff_i + eff_j;
            let (share_i, share_j) = if total > f64::EPSILON {
                (eff_j / total, eff_i / total)
            } else {
                (0.5, 0.5)
            };
            sites[i] -= dir * half * share_i;
            sites[j] += dir * half * share_j;
        }
    }
    pushed
}

/// Clamp every site into `canvas` shrunk by `boundary` on each side.
pub fn clamp_to_bounds(sites: &mut [DVec2], canvas: &Rect, boundary: f64) {
    let inner = canvas.inset(boundary);
    for p in sites.iter_mut() {
        *p = p.clamp(inner.min, inner.max);
    }
}
