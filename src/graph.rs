//! Production graph model and its validated, index-based view.
//!
//! [`ProductionGraph`] is the wire-facing input. [`FlowGraph`] is the
//! validated form the engine works on: nodes in a vector, edges as index
//! pairs, and each multi-belt edge expanded into independent routed lanes
//! (commodities).

use crate::catalog::{self, BuildingKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A production machine in the input graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineNode {
    pub id: String,
    pub label: String,
    pub kind: BuildingKind,
}

/// A directed material flow between two machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialEdge {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub item: String,
    pub belts: u32,
}

/// The full production graph as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionGraph {
    pub id: String,
    pub target_product: String,
    pub target_belts: u32,
    pub nodes: Vec<MachineNode>,
    pub edges: Vec<MaterialEdge>,
}

/// Rejection reasons for a malformed input graph.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
    #[error("duplicate edge id '{0}'")]
    DuplicateEdge(String),
    #[error("edge '{edge}' references unknown node '{node}'")]
    UnknownEndpoint { edge: String, node: String },
    #[error("edge '{0}' connects a node to itself")]
    SelfLoop(String),
    #[error("edge '{0}' requests zero belts")]
    ZeroBelts(String),
    #[error("node '{0}' uses the conveyor kind, which is not a machine")]
    ConveyorNode(String),
}

/// A validated edge, endpoints as indices into the node vector.
#[derive(Debug, Clone)]
pub struct FlowEdge {
    pub id: String,
    pub from: usize,
    pub to: usize,
    pub item: String,
    pub belts: u32,
}

/// One routed lane of a material edge. An edge with `belts = k` contributes
/// `k` commodities, each needing its own disjoint belt path.
#[derive(Debug, Clone, Copy)]
pub struct Commodity {
    /// Index into [`FlowGraph::edges`].
    pub edge: usize,
    /// Lane number within the edge, `0..belts`.
    pub lane: u32,
    pub from: usize,
    pub to: usize,
}

/// Immutable validated view of a [`ProductionGraph`].
#[derive(Debug, Clone)]
pub struct FlowGraph {
    nodes: Vec<MachineNode>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// Validate the input graph and build the index-based view.
    pub fn from_graph(graph: &ProductionGraph) -> Result<FlowGraph, GraphError> {
        let mut id_to_index: HashMap<&str, usize> = HashMap::new();
        for (i, node) in graph.nodes.iter().enumerate() {
            if node.kind == BuildingKind::Conveyor {
                return Err(GraphError::ConveyorNode(node.id.clone()));
            }
            if id_to_index.insert(node.id.as_str(), i).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut seen_edges: HashSet<&str> = HashSet::new();
        let mut edges = Vec::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            if !seen_edges.insert(edge.id.as_str()) {
                return Err(GraphError::DuplicateEdge(edge.id.clone()));
            }
            let from = *id_to_index.get(edge.from_id.as_str()).ok_or_else(|| {
                GraphError::UnknownEndpoint { edge: edge.id.clone(), node: edge.from_id.clone() }
            })?;
            let to = *id_to_index.get(edge.to_id.as_str()).ok_or_else(|| {
                GraphError::UnknownEndpoint { edge: edge.id.clone(), node: edge.to_id.clone() }
            })?;
            if from == to {
                return Err(GraphError::SelfLoop(edge.id.clone()));
            }
            if edge.belts == 0 {
                return Err(GraphError::ZeroBelts(edge.id.clone()));
            }
            edges.push(FlowEdge {
                id: edge.id.clone(),
                from,
                to,
                item: edge.item.clone(),
                belts: edge.belts,
            });
        }

        Ok(FlowGraph { nodes: graph.nodes.clone(), edges })
    }

    pub fn nodes(&self) -> &[MachineNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Footprint `(long, short)` of the node at `index`.
    pub fn footprint(&self, index: usize) -> (u32, u32) {
        catalog::footprint(self.nodes[index].kind)
    }

    /// Sum of footprint areas over all nodes.
    pub fn total_area(&self) -> u64 {
        self.nodes
            .iter()
            .map(|n| catalog::building_def(n.kind).area() as u64)
            .sum()
    }

    /// All routed lanes, one per belt of every edge, in edge order.
    pub fn commodities(&self) -> Vec<Commodity> {
        let mut out = Vec::new();
        for (ei, edge) in self.edges.iter().enumerate() {
            for lane in 0..edge.belts {
                out.push(Commodity { edge: ei, lane, from: edge.from, to: edge.to });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: BuildingKind) -> MachineNode {
        MachineNode { id: id.into(), label: id.to_uppercase(), kind }
    }

    fn edge(id: &str, from: &str, to: &str, belts: u32) -> MaterialEdge {
        MaterialEdge {
            id: id.into(),
            from_id: from.into(),
            to_id: to.into(),
            item: "ore".into(),
            belts,
        }
    }

    fn graph(nodes: Vec<MachineNode>, edges: Vec<MaterialEdge>) -> ProductionGraph {
        ProductionGraph {
            id: "g".into(),
            target_product: "steel".into(),
            target_belts: 1,
            nodes,
            edges,
        }
    }

    #[test]
    fn valid_graph_builds_index_view() {
        let g = graph(
            vec![node("a", BuildingKind::Crusher), node("b", BuildingKind::Refinery)],
            vec![edge("e1", "a", "b", 2)],
        );
        let fg = FlowGraph::from_graph(&g).unwrap();
        assert_eq!(fg.nodes().len(), 2);
        assert_eq!(fg.edges()[0].from, 0);
        assert_eq!(fg.edges()[0].to, 1);
        assert_eq!(fg.total_area(), 18);
        // Two belts expand into two lanes of the same edge
        let lanes = fg.commodities();
        assert_eq!(lanes.len(), 2);
        assert_eq!((lanes[0].edge, lanes[0].lane), (0, 0));
        assert_eq!((lanes[1].edge, lanes[1].lane), (0, 1));
    }

    #[test]
    fn duplicate_node_rejected() {
        let g = graph(
            vec![node("a", BuildingKind::Crusher), node("a", BuildingKind::Molder)],
            vec![],
        );
        assert_eq!(
            FlowGraph::from_graph(&g).unwrap_err(),
            GraphError::DuplicateNode("a".into())
        );
    }

    #[test]
    fn dangling_endpoint_rejected() {
        let g = graph(vec![node("a", BuildingKind::Crusher)], vec![edge("e1", "a", "ghost", 1)]);
        assert_eq!(
            FlowGraph::from_graph(&g).unwrap_err(),
            GraphError::UnknownEndpoint { edge: "e1".into(), node: "ghost".into() }
        );
    }

    #[test]
    fn self_loop_rejected() {
        let g = graph(vec![node("a", BuildingKind::Crusher)], vec![edge("e1", "a", "a", 1)]);
        assert_eq!(FlowGraph::from_graph(&g).unwrap_err(), GraphError::SelfLoop("e1".into()));
    }

    #[test]
    fn zero_belts_rejected() {
        let g = graph(
            vec![node("a", BuildingKind::Crusher), node("b", BuildingKind::Molder)],
            vec![edge("e1", "a", "b", 0)],
        );
        assert_eq!(FlowGraph::from_graph(&g).unwrap_err(), GraphError::ZeroBelts("e1".into()));
    }

    #[test]
    fn conveyor_node_rejected() {
        let g = graph(vec![node("c", BuildingKind::Conveyor)], vec![]);
        assert_eq!(
            FlowGraph::from_graph(&g).unwrap_err(),
            GraphError::ConveyorNode("c".into())
        );
    }

    #[test]
    fn parallel_edges_between_same_pair_allowed() {
        let g = graph(
            vec![node("a", BuildingKind::Crusher), node("b", BuildingKind::Molder)],
            vec![edge("e1", "a", "b", 1), edge("e2", "a", "b", 1)],
        );
        let fg = FlowGraph::from_graph(&g).unwrap();
        assert_eq!(fg.edges().len(), 2);
    }

    #[test]
    fn graph_json_round_trips_camel_case() {
        let g = graph(
            vec![node("a", BuildingKind::Filler)],
            vec![],
        );
        let v: serde_json::Value = serde_json::to_value(&g).unwrap();
        assert!(v.get("targetProduct").is_some());
        let back: ProductionGraph = serde_json::from_value(v).unwrap();
        assert_eq!(back, g);
    }
}
