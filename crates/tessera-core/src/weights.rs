use crate::graph::CellGraph;
use crate::harmony::HarmonyGate;
use crate::territory::TerritoryMap;

/// Per-cell weight for the repulsion solver.
///
/// Starts from each cell's visible area, then repeatedly lets every colored
/// cell and each same-colored neighbor (consonant only, when `harmony` is
/// given) take the larger of their two weights. A connected territory thus
/// ends up weighing as much as its largest cell. Runs at most
/// `max_iterations` passes and stops early on a pass without change; large
/// territories may not fully settle within the budget.
pub fn compute_weights<G: CellGraph>(
    graph: &G,
    territory: &TerritoryMap,
    harmony: Option<&HarmonyGate>,
    max_iterations: usize,
) -> Vec<f64> {
    let n = graph.site_count();
    let mut weight: Vec<f64> = (0..n).map(|i| graph.visible_area(i)).collect();

    for pass in 0..max_iterations {
        let mut changed = false;
        for i in 0..n {
            let color = territory.color(i);
            if !color.is_colored() {
                continue;
            }
            for &j in graph.neighbors(i) {
                if territory.color(j) != color {
                    continue;
                }
                if harmony.is_some_and(|h| !h.harmonic(i, j)) {
                    continue;
                }
                let bigger = weight[i].max(weight[j]);
                if weight[i] != bigger {
                    weight[i] = bigger;
                    changed = true;
                }
                if weight[j] != bigger {
                    weight[j] = bigger;
                    changed = true;
                }
            }
        }
        if !changed {
            log::debug!("[weights] settled after {} passes", pass + 1);
            break;
        }
    }
    weight
}

/// Give the dragged site back its own area so inherited territory weight
/// does not fight the pointer.
pub fn pin_dragged_weight<G: CellGraph>(weights: &mut [f64], graph: &G, dragged: usize) {
    if let Some(w) = weights.get_mut(dragged) {
        *w = graph.visible_area(dragged);
    }
}
