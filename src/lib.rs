//! SAT-based compact layout engine for factory production graphs.
//!
//! Given a directed material-flow graph over production machines, the
//! engine places every machine footprint on an integer grid and routes a
//! unit-belt path for every material edge, searching for the smallest
//! feasible bounding rectangle:
//!
//! ```text
//! ProductionGraph
//!   → FlowGraph       (validated, index-based view)
//!   → Bounds schedule (area estimate + monotone expansion)
//!   → Cell encoding   (tile types, footprint anchors, routed belt arcs)
//!   → SAT check       (varisat, per-attempt timeout)
//!   → Extraction      (placements + belt segments, invariants re-checked)
//!   → Stream          (attempt events, one terminal solution)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use beltloom::{solve_blocking, BuildingKind, MachineNode, MaterialEdge,
//!                ProductionGraph, SolverConfig};
//!
//! let graph = ProductionGraph {
//!     id: "steel".into(),
//!     target_product: "steel".into(),
//!     target_belts: 1,
//!     nodes: vec![
//!         MachineNode { id: "c".into(), label: "Crusher".into(), kind: BuildingKind::Crusher },
//!         MachineNode { id: "r".into(), label: "Refinery".into(), kind: BuildingKind::Refinery },
//!     ],
//!     edges: vec![MaterialEdge {
//!         id: "ore".into(),
//!         from_id: "c".into(),
//!         to_id: "r".into(),
//!         item: "ore".into(),
//!         belts: 1,
//!     }],
//! };
//!
//! let solution = solve_blocking(&graph, SolverConfig::default()).unwrap();
//! println!("{}", solution.render());
//! ```

pub mod bounds;
pub mod catalog;
pub mod config;
mod cnf;
mod encode;
mod extract;
pub mod graph;
mod packing;
pub mod session;
mod solver;
pub mod types;

pub use catalog::{building_def, footprint, ports, BuildingDef, BuildingKind};
pub use config::{EncodingMode, FixedDimensionMode, SolverConfig};
pub use graph::{FlowGraph, GraphError, MachineNode, MaterialEdge, ProductionGraph};
pub use session::{CancelToken, Session, SolveError};
pub use types::{
    Attempt, BeltSegment, Bounds, Direction, LayoutSolution, PlacedBuilding, SolveStatus,
    StreamItem,
};

/// Start a solving session. Validates the graph and config up front and
/// returns a lazy stream of attempt events ending in one terminal
/// solution.
pub fn solve(graph: &ProductionGraph, config: SolverConfig) -> Result<Session, SolveError> {
    Session::new(graph, config)
}

/// Run a session to completion and return the terminal solution.
pub fn solve_blocking(
    graph: &ProductionGraph,
    config: SolverConfig,
) -> Result<LayoutSolution, SolveError> {
    let session = solve(graph, config)?;
    let mut terminal = None;
    for item in session {
        if let StreamItem::Solution(solution) = item? {
            terminal = Some(solution);
        }
    }
    terminal.ok_or_else(|| SolveError::Internal("session ended without a solution".into()))
}

/// Readiness probe for the hosting service: the engine has no state to
/// warm up, so this is constant. Exposed so a transport can answer health
/// checks without touching a session.
pub fn ready() -> bool {
    true
}
