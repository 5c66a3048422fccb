//! Bounds schedule: initial rectangle estimate and monotone expansion.

use crate::config::{FixedDimensionMode, SolverConfig};
use crate::graph::FlowGraph;

/// Estimate the starting rectangle from the total footprint area.
///
/// The side is the largest of: the longest machine side (so any single
/// machine fits on either axis), and the ceiling square root of the summed
/// area. An empty graph estimates a 0x0 board.
pub fn estimate_initial_bounds(graph: &FlowGraph) -> (u32, u32) {
    let max_long = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, _)| graph.footprint(i).0)
        .max()
        .unwrap_or(0);
    let max_short = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, _)| graph.footprint(i).1)
        .max()
        .unwrap_or(0);
    let area = graph.total_area();
    let sqrt_side = (area as f64).sqrt().ceil() as u32;
    let side = max_long.max(max_short).max(sqrt_side);
    (side, side)
}

/// Starting rectangle after applying per-axis caller overrides.
pub fn initial_bounds(graph: &FlowGraph, config: &SolverConfig) -> (u32, u32) {
    let (est_w, est_h) = estimate_initial_bounds(graph);
    (
        config.initial_width.unwrap_or(est_w),
        config.initial_height.unwrap_or(est_h),
    )
}

/// The next rectangle after attempt `iteration` (1-indexed) came back
/// unsat. In `None` mode the grown axis alternates on the parity of the
/// failed attempt: odd iterations grow height, even iterations grow width.
pub fn expand_bounds(
    width: u32,
    height: u32,
    config: &SolverConfig,
    iteration: u32,
) -> (u32, u32) {
    let step = config.expansion_step.max(1);
    match config.fixed_dimension_mode {
        FixedDimensionMode::Width => (width, height + step),
        FixedDimensionMode::Height => (width + step, height),
        FixedDimensionMode::None => {
            if iteration % 2 == 0 {
                (width + step, height)
            } else {
                (width, height + step)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingKind;
    use crate::graph::{FlowGraph, MachineNode, ProductionGraph};

    fn graph_of(kinds: &[BuildingKind]) -> FlowGraph {
        let nodes = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| MachineNode { id: format!("n{i}"), label: format!("N{i}"), kind })
            .collect();
        let g = ProductionGraph {
            id: "g".into(),
            target_product: "x".into(),
            target_belts: 1,
            nodes,
            edges: vec![],
        };
        FlowGraph::from_graph(&g).unwrap()
    }

    #[test]
    fn estimate_covers_largest_side() {
        // One grinder: area 18, sqrt ceil 5, but the long side is 6.
        let g = graph_of(&[BuildingKind::Grinder]);
        assert_eq!(estimate_initial_bounds(&g), (6, 6));
    }

    #[test]
    fn estimate_grows_with_area() {
        // Four crushers: area 36, side 6.
        let g = graph_of(&[BuildingKind::Crusher; 4]);
        assert_eq!(estimate_initial_bounds(&g), (6, 6));
    }

    #[test]
    fn estimate_empty_graph_is_zero() {
        let g = graph_of(&[]);
        assert_eq!(estimate_initial_bounds(&g), (0, 0));
    }

    #[test]
    fn overrides_apply_per_axis() {
        let g = graph_of(&[BuildingKind::Refinery]);
        let config = SolverConfig { initial_width: Some(9), ..SolverConfig::default() };
        assert_eq!(initial_bounds(&g, &config), (9, 3));
    }

    #[test]
    fn fixed_width_grows_height_only() {
        let config = SolverConfig {
            fixed_dimension_mode: FixedDimensionMode::Width,
            ..SolverConfig::default()
        };
        assert_eq!(expand_bounds(3, 5, &config, 1), (3, 6));
        assert_eq!(expand_bounds(3, 6, &config, 2), (3, 7));
    }

    #[test]
    fn fixed_height_grows_width_only() {
        let config = SolverConfig {
            fixed_dimension_mode: FixedDimensionMode::Height,
            ..SolverConfig::default()
        };
        assert_eq!(expand_bounds(3, 5, &config, 1), (4, 5));
    }

    #[test]
    fn alternating_mode_grows_height_first() {
        let config = SolverConfig::default();
        let (w1, h1) = expand_bounds(6, 6, &config, 1);
        assert_eq!((w1, h1), (6, 7));
        let (w2, h2) = expand_bounds(w1, h1, &config, 2);
        assert_eq!((w2, h2), (7, 7));
    }

    #[test]
    fn schedule_is_strictly_monotone() {
        let config = SolverConfig { expansion_step: 2, ..SolverConfig::default() };
        let (mut w, mut h) = (4, 4);
        for k in 1..=10 {
            let (nw, nh) = expand_bounds(w, h, &config, k);
            assert!(nw > w || nh > h);
            assert!(nw >= w && nh >= h);
            w = nw;
            h = nh;
        }
    }
}
