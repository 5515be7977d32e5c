// Tests for seeding and largest-colored-neighbor propagation.

use tessera_core::{AdjacencyGraph, CellGraph, Color, HarmonyGate, TerritoryError, TerritoryMap};

// 0 - 1 - 2 - 3 - 4 with a chord 1 - 3.
fn five_cells() -> AdjacencyGraph {
    AdjacencyGraph::new(
        vec![50.0, 10.0, 5.0, 20.0, 40.0],
        &[(0, 1), (1, 2), (2, 3), (3, 4), (1, 3)],
    )
}

#[test]
fn seeds_pick_largest_and_largest_non_neighbor() {
    let g = five_cells();
    let mut map = TerritoryMap::new(5);
    let seeds = map.seed(&g).expect("graph has a disjoint second seed");
    assert_eq!((seeds.a, seeds.b), (0, 4));
    assert_eq!(map.color(0), Color::A);
    assert_eq!(map.color(4), Color::B);
    assert_eq!(map.active_color(), Some(Color::A));
    assert!((1..4).all(|i| map.color(i) == Color::Uncolored));
}

#[test]
fn propagation_yields_exact_color_map() {
    let g = five_cells();
    let mut map = TerritoryMap::new(5);
    map.seed(&g).expect("seed");
    let report = map.propagate(&g, 12, None);

    let colors: Vec<Color> = (0..5).map(|i| map.color(i)).collect();
    assert_eq!(colors, vec![Color::A, Color::A, Color::B, Color::B, Color::B]);
    assert_eq!(report.passes, 2, "second pass should see no changes");
    assert_eq!(report.recolored, 3);
    assert!(report.converged);
}

#[test]
fn propagation_covers_a_connected_graph() {
    let areas: Vec<f64> = (0..12).map(|i| ((i * 7) % 11 + 1) as f64).collect();
    let g = AdjacencyGraph::path(areas);
    let mut map = TerritoryMap::new(g.site_count());
    map.seed(&g).expect("a path always has a disjoint second seed");
    let report = map.propagate(&g, 50, None);
    assert!(report.converged);
    for i in 0..g.site_count() {
        assert!(map.color(i).is_colored(), "cell {} left uncolored", i);
    }
}

#[test]
fn every_cell_matches_its_largest_colored_neighbor_after_convergence() {
    let g = five_cells();
    let mut map = TerritoryMap::new(5);
    map.seed(&g).expect("seed");
    map.propagate(&g, 12, None);
    for i in 0..5 {
        let source = g
            .neighbors(i)
            .iter()
            .copied()
            .filter(|&j| map.color(j).is_colored())
            .max_by(|&a, &b| g.visible_area(a).total_cmp(&g.visible_area(b)));
        if let Some(j) = source {
            assert_eq!(map.color(i), map.color(j), "cell {} disagrees with {}", i, j);
        }
    }
}

#[test]
fn complete_graph_refuses_to_seed() {
    let g = AdjacencyGraph::new(vec![3.0, 2.0, 1.0], &[(0, 1), (1, 2), (0, 2)]);
    let mut map = TerritoryMap::new(3);
    assert_eq!(map.seed(&g), Err(TerritoryError::NoDisjointSeed(0)));
    assert!((0..3).all(|i| !map.color(i).is_colored()), "failed seeding must not color");
}

#[test]
fn single_site_is_too_few() {
    let g = AdjacencyGraph::new(vec![1.0], &[]);
    let mut map = TerritoryMap::new(1);
    assert_eq!(map.seed(&g), Err(TerritoryError::TooFewSites(1)));
}

#[test]
fn locked_cell_keeps_its_color() {
    let g = five_cells();
    let mut map = TerritoryMap::new(5);
    map.seed(&g).expect("seed");
    map.set_locked(1, true);
    map.propagate(&g, 12, None);
    assert_eq!(map.color(1), Color::Uncolored);
    assert_eq!(map.color(2), Color::B);
}

#[test]
fn harmony_gate_blocks_small_consonant_donor() {
    let g = AdjacencyGraph::path(vec![10.0, 30.0]);
    // Equal pitches are always consonant.
    let strict = HarmonyGate::new(vec![440.0, 440.0], vec![10.0, 30.0], 0.5);
    let mut map = TerritoryMap::new(2);
    map.set_color(0, Color::A);
    map.propagate(&g, 5, Some(&strict));
    assert_eq!(map.color(1), Color::Uncolored, "10 > 30 * 0.5 fails, transfer blocked");

    let loose = HarmonyGate::new(vec![440.0, 440.0], vec![10.0, 30.0], 0.9);
    map.propagate(&g, 5, Some(&loose));
    assert_eq!(map.color(1), Color::A);
}

#[test]
fn harmony_gate_ignores_dissonant_pairs() {
    let g = AdjacencyGraph::path(vec![10.0, 30.0]);
    let gate = HarmonyGate::new(vec![500.0, 443.0], vec![10.0, 30.0], 1.0);
    let mut map = TerritoryMap::new(2);
    map.set_color(0, Color::A);
    map.propagate(&g, 5, Some(&gate));
    assert_eq!(map.color(1), Color::A);
}

#[test]
fn front_lines_list_each_border_once() {
    let g = five_cells();
    let mut map = TerritoryMap::new(5);
    map.seed(&g).expect("seed");
    map.propagate(&g, 12, None);
    let fronts: Vec<(usize, usize)> = map.front_lines(&g).iter().map(|f| (f.a, f.b)).collect();
    assert_eq!(fronts, vec![(1, 2), (1, 3)]);
}

#[test]
fn active_color_toggles() {
    let mut map = TerritoryMap::new(0);
    assert_eq!(map.toggle_active_color(), Color::A);
    assert_eq!(map.toggle_active_color(), Color::B);
    map.set_active_color(Color::Uncolored);
    assert_eq!(map.active_color(), Some(Color::B));
}
