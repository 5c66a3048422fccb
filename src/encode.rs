//! Cell-based Boolean encoding of placement and belt routing.
//!
//! For a trial W×H rectangle, every cell gets type variables (empty /
//! machine / conveyor / bridge), per-node ownership variables, and
//! per-side input/output direction variables. Machine footprints are
//! selected through one-hot anchor variables. Every routed lane of every
//! material edge (a commodity) gets arc variables describing which
//! neighbor it flows toward at each cell.
//!
//! Port convention: material is emitted from a footprint's bottom row into
//! the cell directly below, and delivered into a footprint's top row from
//! the cell directly above. Both are downward arcs, so the `Down` cases in
//! the flow constraints carry machine-boundary escapes.

use crate::cnf::{neg, pos, Formula};
use crate::graph::{Commodity, FlowGraph};
use crate::types::Direction;
use varisat::{CnfFormula, Lit, Var};

/// Decision variables for one grid cell.
pub struct CellVars {
    pub empty: Var,
    pub machine: Var,
    pub conveyor: Var,
    pub bridge: Var,
    /// One ownership variable per graph node.
    pub owner: Vec<Var>,
    /// Material enters from this side, indexed by [`Direction::index`].
    pub input: [Var; 4],
    /// Material exits toward this side.
    pub output: [Var; 4],
}

/// A feasible top-left anchor position for one node's footprint.
pub struct Anchor {
    pub x: u32,
    pub y: u32,
    pub var: Var,
}

/// Routing variables for one commodity.
pub struct FlowVars {
    /// `arc[cell][d]`: the commodity flows from this cell toward its
    /// side-`d` neighbor. `None` where the neighbor is out of bounds.
    pub arc: Vec<[Option<Var>; 4]>,
    /// The commodity leaves this cell (any direction).
    pub used: Vec<Var>,
    /// The commodity leaves this cell vertically / horizontally.
    pub used_v: Vec<Var>,
    pub used_h: Vec<Var>,
    /// Emission marker: this source-machine cell feeds the first belt cell.
    pub source: Vec<Option<Var>>,
    /// Delivery marker: this belt cell feeds the destination's top row.
    pub sink: Vec<Option<Var>>,
}

/// The assembled model for one attempt: CNF plus the variable handles the
/// extractor needs to read a satisfying assignment back.
pub struct CellModel {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CellVars>,
    pub anchors: Vec<Vec<Anchor>>,
    pub commodities: Vec<Commodity>,
    pub flows: Vec<FlowVars>,
    formula: Formula,
}

impl CellModel {
    /// Build the full constraint model for `graph` on a `width`×`height`
    /// board.
    pub fn build(graph: &FlowGraph, width: u32, height: u32) -> CellModel {
        let mut model = CellModel {
            width,
            height,
            cells: Vec::new(),
            anchors: Vec::new(),
            commodities: graph.commodities(),
            flows: Vec::new(),
            formula: Formula::new(),
        };
        model.allocate(graph);
        model.tile_constraints();
        model.footprint_constraints(graph);
        model.adjacency_constraints(graph);
        model.belt_continuity();
        model.flow_constraints();
        model.capacity_constraints();
        log::debug!(
            "cell model {}x{}: {} vars, {} clauses",
            width,
            height,
            model.formula.var_count(),
            model.formula.clause_count()
        );
        model
    }

    /// Hand the finished CNF to the solver; the remaining handles stay
    /// valid for extraction.
    pub fn take_cnf(&mut self) -> CnfFormula {
        std::mem::replace(&mut self.formula, Formula::new()).into_cnf()
    }

    /// Force a node's footprint anchor, for tests that need a fixed
    /// geometry. Panics if the position is not a feasible anchor.
    #[cfg(test)]
    pub fn pin_anchor(&mut self, node: usize, x: u32, y: u32) {
        let anchor = self.anchors[node]
            .iter()
            .find(|a| a.x == x && a.y == y)
            .unwrap_or_else(|| panic!("no feasible anchor at ({x}, {y}) for node {node}"));
        let lit = pos(anchor.var);
        self.formula.add(&[lit]);
    }

    pub fn cell_index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    fn neighbor(&self, x: u32, y: u32, d: Direction) -> Option<(u32, u32)> {
        let (dx, dy) = d.delta();
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            None
        } else {
            Some((nx as u32, ny as u32))
        }
    }

    fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    // -----------------------------------------------------------------
    // Variable allocation
    // -----------------------------------------------------------------

    fn allocate(&mut self, graph: &FlowGraph) {
        let node_count = graph.nodes().len();
        for _ in 0..self.cell_count() {
            let empty = self.formula.var();
            let machine = self.formula.var();
            let conveyor = self.formula.var();
            let bridge = self.formula.var();
            let owner = (0..node_count).map(|_| self.formula.var()).collect();
            let input = [
                self.formula.var(),
                self.formula.var(),
                self.formula.var(),
                self.formula.var(),
            ];
            let output = [
                self.formula.var(),
                self.formula.var(),
                self.formula.var(),
                self.formula.var(),
            ];
            self.cells.push(CellVars { empty, machine, conveyor, bridge, owner, input, output });
        }

        for n in 0..node_count {
            let (long, short) = graph.footprint(n);
            let mut anchors = Vec::new();
            if long <= self.width && short <= self.height {
                for y in 0..=self.height - short {
                    for x in 0..=self.width - long {
                        anchors.push(Anchor { x, y, var: self.formula.var() });
                    }
                }
            }
            self.anchors.push(anchors);
        }

        for _ in 0..self.commodities.len() {
            let mut arc = Vec::with_capacity(self.cell_count());
            let mut source = Vec::with_capacity(self.cell_count());
            let mut sink = Vec::with_capacity(self.cell_count());
            let mut used = Vec::with_capacity(self.cell_count());
            let mut used_v = Vec::with_capacity(self.cell_count());
            let mut used_h = Vec::with_capacity(self.cell_count());
            for y in 0..self.height {
                for x in 0..self.width {
                    let mut dirs = [None; 4];
                    for d in Direction::ALL {
                        if self.neighbor(x, y, d).is_some() {
                            dirs[d.index()] = Some(self.formula.var());
                        }
                    }
                    arc.push(dirs);
                    let below = self.neighbor(x, y, Direction::Down).is_some();
                    source.push(if below { Some(self.formula.var()) } else { None });
                    sink.push(if below { Some(self.formula.var()) } else { None });
                    used.push(self.formula.var());
                    used_v.push(self.formula.var());
                    used_h.push(self.formula.var());
                }
            }
            self.flows.push(FlowVars { arc, used, used_v, used_h, source, sink });
        }
    }

    // -----------------------------------------------------------------
    // Tile-local constraints
    // -----------------------------------------------------------------

    fn tile_constraints(&mut self) {
        for i in 0..self.cell_count() {
            let cell = &self.cells[i];
            let (empty, machine, conveyor, bridge) =
                (cell.empty, cell.machine, cell.conveyor, cell.bridge);
            let owners: Vec<Lit> = cell.owner.iter().map(|&v| pos(v)).collect();
            let inputs: Vec<Lit> = cell.input.iter().map(|&v| pos(v)).collect();
            let outputs: Vec<Lit> = cell.output.iter().map(|&v| pos(v)).collect();

            // One tile type per cell.
            self.formula
                .exactly_one(&[pos(empty), pos(machine), pos(conveyor), pos(bridge)]);

            // Ownership coheres with the machine type bit.
            for &o in &owners {
                self.formula.implies(o, pos(machine));
            }
            self.formula.at_most_one(&owners);
            self.formula.implies_any(pos(machine), &owners);

            // Empty and machine cells carry no direction bits.
            for d in Direction::ALL {
                self.formula.implies(pos(empty), neg(self.cells[i].input[d.index()]));
                self.formula.implies(pos(empty), neg(self.cells[i].output[d.index()]));
                self.formula.implies(pos(machine), neg(self.cells[i].input[d.index()]));
                self.formula.implies(pos(machine), neg(self.cells[i].output[d.index()]));
            }

            // A conveyor has one input side, one output side, never the same.
            self.formula.implies_any(pos(conveyor), &inputs);
            self.formula.at_most_one_if(pos(conveyor), &inputs);
            self.formula.implies_any(pos(conveyor), &outputs);
            self.formula.at_most_one_if(pos(conveyor), &outputs);
            for d in Direction::ALL {
                self.formula.add(&[
                    neg(conveyor),
                    neg(self.cells[i].input[d.index()]),
                    neg(self.cells[i].output[d.index()]),
                ]);
            }

            // A bridge passes one flow straight through per axis.
            let up = Direction::Up.index();
            let down = Direction::Down.index();
            let left = Direction::Left.index();
            let right = Direction::Right.index();
            let input = self.cells[i].input;
            let output = self.cells[i].output;
            self.formula.add(&[neg(bridge), pos(input[up]), pos(input[down])]);
            self.formula.add(&[neg(bridge), neg(input[up]), neg(input[down])]);
            self.formula.add(&[neg(bridge), pos(input[left]), pos(input[right])]);
            self.formula.add(&[neg(bridge), neg(input[left]), neg(input[right])]);
            for (din, dout) in [(up, down), (down, up), (left, right), (right, left)] {
                self.formula.implies2(pos(bridge), pos(input[din]), pos(output[dout]));
                self.formula.implies2(pos(bridge), pos(output[dout]), pos(input[din]));
            }
        }
    }

    fn footprint_constraints(&mut self, graph: &FlowGraph) {
        for n in 0..graph.nodes().len() {
            let (long, short) = graph.footprint(n);
            let anchor_lits: Vec<Lit> = self.anchors[n].iter().map(|a| pos(a.var)).collect();
            // No feasible anchor leaves an empty clause: the board is too
            // small and this attempt is unsatisfiable.
            self.formula.exactly_one(&anchor_lits);

            // An anchor claims every covered cell for the node.
            for ai in 0..self.anchors[n].len() {
                let (ax, ay, avar) =
                    (self.anchors[n][ai].x, self.anchors[n][ai].y, self.anchors[n][ai].var);
                for dy in 0..short {
                    for dx in 0..long {
                        let ci = self.cell_index(ax + dx, ay + dy);
                        self.formula.implies(pos(avar), pos(self.cells[ci].owner[n]));
                    }
                }
            }

            // And ownership anywhere must be explained by a covering anchor.
            for y in 0..self.height {
                for x in 0..self.width {
                    let covering: Vec<Lit> = self.anchors[n]
                        .iter()
                        .filter(|a| {
                            a.x <= x && x < a.x + long && a.y <= y && y < a.y + short
                        })
                        .map(|a| pos(a.var))
                        .collect();
                    let ci = self.cell_index(x, y);
                    let owner = pos(self.cells[ci].owner[n]);
                    self.formula.implies_any(owner, &covering);
                }
            }
        }
    }

    /// Distinct machines may touch only at corners: a machine cell next to
    /// another machine cell must share its owner.
    fn adjacency_constraints(&mut self, graph: &FlowGraph) {
        let node_count = graph.nodes().len();
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.cell_index(x, y);
                for d in [Direction::Right, Direction::Down] {
                    let Some((nx, ny)) = self.neighbor(x, y, d) else { continue };
                    let j = self.cell_index(nx, ny);
                    for n in 0..node_count {
                        let oi = pos(self.cells[i].owner[n]);
                        let oj = pos(self.cells[j].owner[n]);
                        self.formula.add(&[!oi, neg(self.cells[j].machine), oj]);
                        self.formula.add(&[!oj, neg(self.cells[i].machine), oi]);
                    }
                }
            }
        }
    }

    /// Tile-level belt coherence: a direction bit must point at a belt
    /// neighbor with the matching opposite bit, or at a machine for the
    /// downward delivery/emission cases.
    fn belt_continuity(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.cell_index(x, y);
                for d in Direction::ALL {
                    let out_bit = pos(self.cells[i].output[d.index()]);
                    let in_bit = pos(self.cells[i].input[d.index()]);
                    match self.neighbor(x, y, d) {
                        None => {
                            self.formula.add(&[!out_bit]);
                            self.formula.add(&[!in_bit]);
                        }
                        Some((nx, ny)) => {
                            let j = self.cell_index(nx, ny);
                            let opp = d.opposite().index();
                            if d == Direction::Down {
                                self.formula.add(&[
                                    !out_bit,
                                    pos(self.cells[j].input[opp]),
                                    pos(self.cells[j].machine),
                                ]);
                            } else {
                                self.formula.implies(out_bit, pos(self.cells[j].input[opp]));
                            }
                            if d == Direction::Up {
                                self.formula.add(&[
                                    !in_bit,
                                    pos(self.cells[j].output[opp]),
                                    pos(self.cells[j].machine),
                                ]);
                            } else {
                                self.formula.implies(in_bit, pos(self.cells[j].output[opp]));
                            }
                        }
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Per-commodity routing
    // -----------------------------------------------------------------

    /// Arcs into cell `(x, y)` for commodity `k`, one per in-bounds
    /// neighbor.
    fn arcs_into(&self, k: usize, x: u32, y: u32) -> Vec<Lit> {
        let mut lits = Vec::new();
        for d in Direction::ALL {
            if let Some((nx, ny)) = self.neighbor(x, y, d) {
                let j = self.cell_index(nx, ny);
                if let Some(v) = self.flows[k].arc[j][d.opposite().index()] {
                    lits.push(pos(v));
                }
            }
        }
        lits
    }

    fn arcs_out_of(&self, k: usize, i: usize) -> Vec<Lit> {
        self.flows[k].arc[i].iter().flatten().map(|&v| pos(v)).collect()
    }

    fn flow_constraints(&mut self) {
        for k in 0..self.commodities.len() {
            let Commodity { from, to, .. } = self.commodities[k];
            let mut source_lits = Vec::new();
            let mut sink_lits = Vec::new();

            for y in 0..self.height {
                for x in 0..self.width {
                    let i = self.cell_index(x, y);
                    let owner_u = pos(self.cells[i].owner[from]);

                    for d in Direction::ALL {
                        let Some(a) = self.flows[k].arc[i][d.index()] else { continue };
                        let a = pos(a);
                        let (nx, ny) = self.neighbor(x, y, d).expect("arc var has a target");
                        let j = self.cell_index(nx, ny);
                        let out_bit = pos(self.cells[i].output[d.index()]);
                        let in_bit = pos(self.cells[j].input[d.opposite().index()]);
                        let owner_v_j = pos(self.cells[j].owner[to]);

                        // The carrying tile points where the flow goes;
                        // downward arcs may instead leave a source machine
                        // or enter the destination machine.
                        if d == Direction::Down {
                            self.formula.add(&[!a, out_bit, owner_u]);
                            self.formula.add(&[!a, in_bit, owner_v_j]);
                        } else {
                            self.formula.implies(a, out_bit);
                            self.formula.implies(a, in_bit);
                        }

                        // Conservation: an arc out was fed by an arc in
                        // (unless emitted by the source machine), and an
                        // arc in flows onward (unless it delivered).
                        let mut fed = vec![!a, owner_u];
                        fed.extend(self.arcs_into(k, x, y));
                        self.formula.add(&fed);

                        let mut onward = vec![!a, owner_v_j];
                        onward.extend(self.arcs_out_of(k, j));
                        self.formula.add(&onward);
                    }

                    // A commodity passes through a cell at most once.
                    let ins = self.arcs_into(k, x, y);
                    let outs = self.arcs_out_of(k, i);
                    self.formula.at_most_one(&ins);
                    self.formula.at_most_one(&outs);

                    // Bridges pass flows straight through.
                    let bridge = pos(self.cells[i].bridge);
                    for d in Direction::ALL {
                        let Some((nx, ny)) = self.neighbor(x, y, d) else { continue };
                        let j = self.cell_index(nx, ny);
                        let Some(arc_in) = self.flows[k].arc[j][d.opposite().index()] else {
                            continue;
                        };
                        match self.flows[k].arc[i][d.opposite().index()] {
                            Some(arc_out) => {
                                self.formula.implies2(bridge, pos(arc_in), pos(arc_out));
                            }
                            None => self.formula.add(&[!bridge, neg(arc_in)]),
                        }
                    }

                    // Usage indicators, per axis for the bridge capacity.
                    let used = self.flows[k].used[i];
                    let used_v = self.flows[k].used_v[i];
                    let used_h = self.flows[k].used_h[i];
                    let mut vertical = Vec::new();
                    let mut horizontal = Vec::new();
                    for d in Direction::ALL {
                        if let Some(v) = self.flows[k].arc[i][d.index()] {
                            self.formula.implies(pos(v), pos(used));
                            if d.is_vertical() {
                                self.formula.implies(pos(v), pos(used_v));
                                vertical.push(pos(v));
                            } else {
                                self.formula.implies(pos(v), pos(used_h));
                                horizontal.push(pos(v));
                            }
                        }
                    }
                    self.formula.implies_any(pos(used), &outs);
                    self.formula.implies_any(pos(used_v), &vertical);
                    self.formula.implies_any(pos(used_h), &horizontal);

                    // Emission and delivery markers (downward by the port
                    // convention).
                    if let Some(below) = self.neighbor(x, y, Direction::Down) {
                        let bi = self.cell_index(below.0, below.1);
                        let arc_down = pos(
                            self.flows[k].arc[i][Direction::Down.index()]
                                .expect("down neighbor exists"),
                        );
                        let owner_v_below = pos(self.cells[bi].owner[to]);
                        let s = self.flows[k].source[i].expect("source var allocated");
                        let t = self.flows[k].sink[i].expect("sink var allocated");

                        self.formula.implies(pos(s), owner_u);
                        self.formula.implies(pos(s), arc_down);
                        self.formula.implies2(arc_down, owner_u, pos(s));
                        source_lits.push(pos(s));

                        self.formula.implies(pos(t), arc_down);
                        self.formula.implies(pos(t), owner_v_below);
                        self.formula.implies2(arc_down, owner_v_below, pos(t));
                        sink_lits.push(pos(t));
                    }
                }
            }

            // Exactly one emission and one delivery per commodity.
            self.formula.exactly_one(&source_lits);
            self.formula.exactly_one(&sink_lits);

            self.path_length_constraints(k);
        }
    }

    /// A routed path spans at least three belt cells: the first belt cell
    /// below the source may not deliver, and neither may its successor.
    fn path_length_constraints(&mut self, k: usize) {
        let from = self.commodities[k].from;
        for y in 0..self.height {
            for x in 0..self.width {
                let m = self.cell_index(x, y);
                let Some(emit) = self.flows[k].arc[m][Direction::Down.index()] else { continue };
                let Some((px, py)) = self.neighbor(x, y, Direction::Down) else { continue };
                let p = self.cell_index(px, py);
                let owner_u = pos(self.cells[m].owner[from]);

                if let Some(t1) = self.flows[k].sink[p] {
                    self.formula.add(&[!owner_u, neg(emit), neg(t1)]);
                }
                for d in Direction::ALL {
                    let Some(hop) = self.flows[k].arc[p][d.index()] else { continue };
                    let Some((qx, qy)) = self.neighbor(px, py, d) else { continue };
                    let q = self.cell_index(qx, qy);
                    if let Some(t2) = self.flows[k].sink[q] {
                        self.formula.add(&[!owner_u, neg(emit), neg(hop), neg(t2)]);
                    }
                }
            }
        }
    }

    /// Conveyors carry exactly one commodity; bridges carry exactly one
    /// per axis, on both axes (no degenerate single-axis bridges).
    fn capacity_constraints(&mut self) {
        for i in 0..self.cell_count() {
            let conveyor = pos(self.cells[i].conveyor);
            let bridge = pos(self.cells[i].bridge);
            let used: Vec<Lit> = self.flows.iter().map(|f| pos(f.used[i])).collect();
            let used_v: Vec<Lit> = self.flows.iter().map(|f| pos(f.used_v[i])).collect();
            let used_h: Vec<Lit> = self.flows.iter().map(|f| pos(f.used_h[i])).collect();

            self.formula.implies_any(conveyor, &used);
            self.formula.at_most_one_if(conveyor, &used);

            self.formula.implies_any(bridge, &used_v);
            self.formula.at_most_one_if(bridge, &used_v);
            self.formula.implies_any(bridge, &used_h);
            self.formula.at_most_one_if(bridge, &used_h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingKind;
    use crate::extract::extract_cells;
    use crate::graph::{MachineNode, MaterialEdge, ProductionGraph};
    use crate::solver::{check, CheckOutcome};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(60);

    fn flow_graph(kinds: &[(&str, BuildingKind)], edges: &[(&str, &str, &str)]) -> FlowGraph {
        let nodes = kinds
            .iter()
            .map(|&(id, kind)| MachineNode { id: id.into(), label: id.to_uppercase(), kind })
            .collect();
        let edges = edges
            .iter()
            .map(|&(id, from, to)| MaterialEdge {
                id: id.into(),
                from_id: from.into(),
                to_id: to.into(),
                item: "ore".into(),
                belts: 1,
            })
            .collect();
        let g = ProductionGraph {
            id: "g".into(),
            target_product: "x".into(),
            target_belts: 1,
            nodes,
            edges,
        };
        FlowGraph::from_graph(&g).unwrap()
    }

    #[test]
    fn single_refinery_fills_a_tight_board() {
        let graph = flow_graph(&[("r", BuildingKind::Refinery)], &[]);
        let mut model = CellModel::build(&graph, 3, 3);
        match check(model.take_cnf(), TIMEOUT) {
            CheckOutcome::Sat(assignment) => {
                let (placements, segments) = extract_cells(&graph, &model, &assignment).unwrap();
                assert_eq!(placements.len(), 1);
                assert_eq!((placements[0].w, placements[0].h), (3, 3));
                assert!(segments.is_empty(), "no edges means no belts");
            }
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn connected_pair_cannot_share_a_six_by_six_board() {
        // Two 3x3 machines on 6x6 can only sit in opposite corners, and
        // the two free corner regions touch only diagonally, so no belt
        // path can connect them.
        let graph = flow_graph(
            &[("a", BuildingKind::Crusher), ("b", BuildingKind::Crusher)],
            &[("e1", "a", "b")],
        );
        let mut model = CellModel::build(&graph, 6, 6);
        assert!(matches!(check(model.take_cnf(), TIMEOUT), CheckOutcome::Unsat));
    }

    #[test]
    fn connected_pair_routes_on_six_by_seven() {
        let graph = flow_graph(
            &[("a", BuildingKind::Crusher), ("b", BuildingKind::Crusher)],
            &[("e1", "a", "b")],
        );
        let mut model = CellModel::build(&graph, 6, 7);
        match check(model.take_cnf(), TIMEOUT) {
            CheckOutcome::Sat(assignment) => {
                let (placements, segments) = extract_cells(&graph, &model, &assignment).unwrap();
                assert_eq!(placements.len(), 2);
                assert!(
                    segments.len() >= 3,
                    "a routed path spans at least three belt cells, got {}",
                    segments.len()
                );
                for s in &segments {
                    assert_eq!(s.edge_id.as_deref(), Some("e1"));
                }
            }
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn swapped_corner_targets_force_a_bridge() {
        // Sources across the top, destinations across the bottom with
        // their columns swapped: the a→b and c→d paths must cross
        // somewhere, and crossing is only legal on a bridge.
        let graph = flow_graph(
            &[
                ("a", BuildingKind::Molder),
                ("b", BuildingKind::Molder),
                ("c", BuildingKind::Molder),
                ("d", BuildingKind::Molder),
            ],
            &[("e1", "a", "b"), ("e2", "c", "d")],
        );
        let mut model = CellModel::build(&graph, 8, 9);
        model.pin_anchor(0, 0, 0); // a: top-left
        model.pin_anchor(2, 5, 0); // c: top-right
        model.pin_anchor(3, 0, 6); // d: bottom-left
        model.pin_anchor(1, 5, 6); // b: bottom-right
        match check(model.take_cnf(), TIMEOUT) {
            CheckOutcome::Sat(assignment) => {
                let (placements, segments) = extract_cells(&graph, &model, &assignment).unwrap();
                assert_eq!(placements.len(), 4);
                let bridges: Vec<_> = segments.iter().filter(|s| s.is_bridge).collect();
                assert!(!bridges.is_empty(), "crossing paths need a bridge:\n{segments:#?}");
                // Both edges are realized.
                for id in ["e1", "e2"] {
                    assert!(
                        segments.iter().any(|s| s.edge_id.as_deref() == Some(id)),
                        "edge {id} has no segments"
                    );
                }
                // The bridge carries a vertical flow; its perpendicular
                // counterpart is the other edge by capacity.
                for b in bridges {
                    assert!(b.in_dir.is_vertical() && b.out_dir.is_vertical());
                }
            }
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn board_too_small_for_footprint_is_unsat() {
        let graph = flow_graph(&[("g", BuildingKind::Grinder)], &[]);
        let mut model = CellModel::build(&graph, 3, 10);
        assert!(matches!(check(model.take_cnf(), TIMEOUT), CheckOutcome::Unsat));
    }
}
