//! Degenerate fallback encoding: rectangle packing without belt routing.
//!
//! Decision variables are one-hot footprint anchors per node; constraints
//! are in-bounds (by anchor construction) and pairwise separation with a
//! configurable gap. The first node is pinned to the origin for symmetry
//! breaking, matching the arithmetic model this replaces. Solutions carry
//! placements only; the reported `segments` list is empty.

use crate::cnf::{neg, pos, Formula};
use crate::encode::Anchor;
use crate::graph::FlowGraph;
use varisat::{CnfFormula, Lit};

/// The assembled packing model for one attempt.
pub struct RectModel {
    pub width: u32,
    pub height: u32,
    pub anchors: Vec<Vec<Anchor>>,
    formula: Formula,
}

/// True if the two footprints, the first inflated by `gap`, intersect.
fn conflicts(ax: u32, ay: u32, aw: u32, ah: u32, bx: u32, by: u32, bw: u32, bh: u32, gap: u32) -> bool {
    let separated = ax + aw + gap <= bx
        || bx + bw + gap <= ax
        || ay + ah + gap <= by
        || by + bh + gap <= ay;
    !separated
}

impl RectModel {
    pub fn build(graph: &FlowGraph, width: u32, height: u32, gap: u32) -> RectModel {
        let mut formula = Formula::new();
        let mut anchors: Vec<Vec<Anchor>> = Vec::new();

        for n in 0..graph.nodes().len() {
            let (long, short) = graph.footprint(n);
            let mut node_anchors = Vec::new();
            if long <= width && short <= height {
                for y in 0..=height - short {
                    for x in 0..=width - long {
                        node_anchors.push(Anchor { x, y, var: formula.var() });
                    }
                }
            }
            let lits: Vec<Lit> = node_anchors.iter().map(|a| pos(a.var)).collect();
            formula.exactly_one(&lits);
            anchors.push(node_anchors);
        }

        // Symmetry breaking: the first machine sits at the origin, as in
        // the arithmetic model. If the origin is not feasible the board
        // cannot host that machine at all.
        if let Some(first) = anchors.first() {
            match first.iter().find(|a| a.x == 0 && a.y == 0) {
                Some(origin) => formula.add(&[pos(origin.var)]),
                None => formula.contradiction(),
            }
        }

        // Pairwise separation with the configured gap.
        for i in 0..anchors.len() {
            let (iw, ih) = graph.footprint(i);
            for j in i + 1..anchors.len() {
                let (jw, jh) = graph.footprint(j);
                for a in &anchors[i] {
                    for b in &anchors[j] {
                        if conflicts(a.x, a.y, iw, ih, b.x, b.y, jw, jh, gap) {
                            formula.add(&[neg(a.var), neg(b.var)]);
                        }
                    }
                }
            }
        }

        log::debug!(
            "packing model {}x{}: {} vars, {} clauses",
            width,
            height,
            formula.var_count(),
            formula.clause_count()
        );
        RectModel { width, height, anchors, formula }
    }

    /// Hand the finished CNF to the solver; the anchors stay valid for
    /// extraction.
    pub fn take_cnf(&mut self) -> CnfFormula {
        std::mem::replace(&mut self.formula, Formula::new()).into_cnf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingKind;
    use crate::extract::extract_rects;
    use crate::graph::{FlowGraph, MachineNode, ProductionGraph};
    use crate::solver::{check, CheckOutcome};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn flow_graph(kinds: &[BuildingKind]) -> FlowGraph {
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
    fn single_machine_lands_on_origin() {
        let graph = flow_graph(&[BuildingKind::Refinery]);
        let mut model = RectModel::build(&graph, 3, 3, 1);
        match check(model.take_cnf(), TIMEOUT) {
            CheckOutcome::Sat(assignment) => {
                let (placements, segments) = extract_rects(&graph, &model, &assignment).unwrap();
                assert_eq!(placements.len(), 1);
                assert_eq!((placements[0].x, placements[0].y), (0, 0));
                assert_eq!((placements[0].w, placements[0].h), (3, 3));
                assert!(segments.is_empty());
            }
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn machine_wider_than_board_is_unsat() {
        let graph = flow_graph(&[BuildingKind::Grinder]);
        let mut model = RectModel::build(&graph, 3, 10, 1);
        assert!(matches!(check(model.take_cnf(), TIMEOUT), CheckOutcome::Unsat));
    }

    #[test]
    fn gap_of_one_forbids_touching_pairs() {
        let graph = flow_graph(&[BuildingKind::Crusher, BuildingKind::Molder]);
        let mut model = RectModel::build(&graph, 7, 6, 1);
        match check(model.take_cnf(), TIMEOUT) {
            CheckOutcome::Sat(assignment) => {
                let (placements, _) = extract_rects(&graph, &model, &assignment).unwrap();
                assert!(!placements[0].touches(&placements[1]));
                assert!(!placements[0].overlaps(&placements[1]));
            }
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn gap_needs_a_clear_lane_between_machines() {
        // Gap separation demands a full empty row or column, so two 3x3
        // machines cannot share a pinned 6x6 board at gap 1.
        let graph = flow_graph(&[BuildingKind::Crusher, BuildingKind::Molder]);
        let mut model = RectModel::build(&graph, 6, 6, 1);
        assert!(matches!(check(model.take_cnf(), TIMEOUT), CheckOutcome::Unsat));
    }

    #[test]
    fn gap_of_zero_allows_touching() {
        let graph = flow_graph(&[BuildingKind::Crusher, BuildingKind::Molder]);
        let mut model = RectModel::build(&graph, 6, 3, 0);
        match check(model.take_cnf(), TIMEOUT) {
            CheckOutcome::Sat(assignment) => {
                let (placements, _) = extract_rects(&graph, &model, &assignment).unwrap();
                assert!(!placements[0].overlaps(&placements[1]));
            }
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn too_small_board_for_two_machines_is_unsat() {
        let graph = flow_graph(&[BuildingKind::Crusher, BuildingKind::Molder]);
        let mut model = RectModel::build(&graph, 3, 3, 0);
        assert!(matches!(check(model.take_cnf(), TIMEOUT), CheckOutcome::Unsat));
    }
}
