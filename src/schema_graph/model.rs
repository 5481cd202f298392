//! Schema graph model
//!
//! A directed multigraph of tables and their relationships. Construction
//! never fails: edges whose endpoints are unknown are dropped and counted.

use crate::api::{GraphPayload, RemoteId, WireEdge, WireNode};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Table,
    Other(String),
}

impl NodeKind {
    pub fn from_wire(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("table") {
            NodeKind::Table
        } else {
            NodeKind::Other(kind.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Table => "table",
            NodeKind::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    pub id: RemoteId,
    pub name: String,
    pub kind: NodeKind,
    /// Structured-or-opaque descriptive text; see `columns_of`
    pub raw_metadata: Option<String>,
}

impl From<WireNode> for SchemaNode {
    fn from(node: WireNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            kind: NodeKind::from_wire(&node.kind),
            raw_metadata: node.metadata_json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEdge {
    pub source_id: RemoteId,
    pub target_id: RemoteId,
    pub kind: String,
    pub raw_metadata: Option<String>,
}

impl From<WireEdge> for SchemaEdge {
    fn from(edge: WireEdge) -> Self {
        Self {
            source_id: edge.source_id,
            target_id: edge.target_id,
            kind: edge.kind,
            raw_metadata: edge.metadata_json,
        }
    }
}

/// Read-only schema graph; every edge endpoint resolves to a node
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    graph: DiGraph<SchemaNode, SchemaEdge>,
    index: HashMap<RemoteId, NodeIndex>,
}

/// Outcome of `build_graph`
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub graph: SchemaGraph,
    /// Edges dropped for referencing an unknown node (non-fatal)
    pub dropped_edges: usize,
}

/// Build a graph from raw nodes and edges, dropping dangling edges
pub fn build_graph(
    nodes: impl IntoIterator<Item = SchemaNode>,
    edges: impl IntoIterator<Item = SchemaEdge>,
) -> BuildReport {
    let mut graph = DiGraph::new();
    let mut index: HashMap<RemoteId, NodeIndex> = HashMap::new();

    for node in nodes {
        if index.contains_key(&node.id) {
            tracing::warn!(node_id = node.id, name = %node.name, "Duplicate schema node ignored");
            continue;
        }
        let id = node.id;
        let idx = graph.add_node(node);
        index.insert(id, idx);
    }

    let mut dropped_edges = 0;
    for edge in edges {
        let (Some(&from_idx), Some(&to_idx)) = (index.get(&edge.source_id), index.get(&edge.target_id)) else {
            tracing::warn!(
                source_id = edge.source_id,
                target_id = edge.target_id,
                "Dropping edge with unknown endpoint"
            );
            dropped_edges += 1;
            continue;
        };
        graph.add_edge(from_idx, to_idx, edge);
    }

    BuildReport {
        graph: SchemaGraph { graph, index },
        dropped_edges,
    }
}

impl SchemaGraph {
    pub fn from_payload(payload: GraphPayload) -> BuildReport {
        build_graph(
            payload.nodes.into_iter().map(SchemaNode::from),
            payload.edges.into_iter().map(SchemaEdge::from),
        )
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: RemoteId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: RemoteId) -> Option<&SchemaNode> {
        self.index.get(&id).map(|&idx| &self.graph[idx])
    }

    /// First node with this name, case-insensitive
    pub fn node_by_name(&self, name: &str) -> Option<&SchemaNode> {
        self.nodes().find(|n| n.name.eq_ignore_ascii_case(name))
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &SchemaEdge> {
        self.graph.edge_weights()
    }

    /// Edges leaving `id`, each with the node it points to
    pub fn outgoing(&self, id: RemoteId) -> Vec<(&SchemaEdge, &SchemaNode)> {
        self.neighbours(id, Direction::Outgoing)
    }

    /// Edges arriving at `id`, each with the node it comes from
    pub fn incoming(&self, id: RemoteId) -> Vec<(&SchemaEdge, &SchemaNode)> {
        self.neighbours(id, Direction::Incoming)
    }

    fn neighbours(&self, id: RemoteId, direction: Direction) -> Vec<(&SchemaEdge, &SchemaNode)> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut related: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), e.weight(), &self.graph[other])
            })
            .collect();
        // petgraph walks adjacency lists newest first
        related.sort_by_key(|(edge_idx, _, _)| *edge_idx);
        related
            .into_iter()
            .map(|(_, edge, node)| (edge, node))
            .collect()
    }
}
