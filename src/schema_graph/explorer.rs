//! Graph exploration controller
//!
//! Holds the current graph and a transient selection. It never mutates the
//! graph itself; replacing the graph resets the selection.

use super::metadata::{columns_of, ColumnInfo};
use super::model::{SchemaEdge, SchemaGraph, SchemaNode};
use crate::api::{RemoteId, RemoteService};
use crate::error::ClientResult;

#[derive(Debug, Default)]
pub struct GraphExplorer {
    graph: SchemaGraph,
    connection_id: Option<RemoteId>,
    selected: Option<RemoteId>,
}

impl GraphExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: SchemaGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Connection whose graph was last loaded
    pub fn connection_id(&self) -> Option<RemoteId> {
        self.connection_id
    }

    pub fn replace_graph(&mut self, graph: SchemaGraph) {
        self.graph = graph;
        self.selected = None;
    }

    /// Fetch a connection's graph and swap it in
    ///
    /// Returns the number of dropped edges. On failure the current graph and
    /// selection stay as they were.
    pub async fn load<R: RemoteService + ?Sized>(
        &mut self,
        remote: &R,
        connection_id: RemoteId,
    ) -> ClientResult<usize> {
        let payload = remote
            .get_graph(connection_id)
            .await
            .inspect_err(|e| tracing::warn!(connection_id, error = %e, "Failed to load schema graph"))?;

        let report = SchemaGraph::from_payload(payload);
        tracing::info!(
            connection_id,
            nodes = report.graph.node_count(),
            edges = report.graph.edge_count(),
            dropped_edges = report.dropped_edges,
            "Schema graph loaded"
        );
        self.replace_graph(report.graph);
        self.connection_id = Some(connection_id);
        Ok(report.dropped_edges)
    }

    /// Select a node; ignored when the id is not in the current graph
    pub fn select_node(&mut self, id: RemoteId) {
        if self.graph.contains(id) {
            self.selected = Some(id);
        } else {
            tracing::debug!(node_id = id, "Ignoring selection of unknown node");
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_node_id(&self) -> Option<RemoteId> {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&SchemaNode> {
        self.selected.and_then(|id| self.graph.node(id))
    }

    /// Columns of the selected node, for the details panel
    pub fn selected_columns(&self) -> Vec<ColumnInfo> {
        self.selected_node().map(columns_of).unwrap_or_default()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&SchemaNode> {
        self.graph.node_by_name(name)
    }

    pub fn outgoing(&self, id: RemoteId) -> Vec<(&SchemaEdge, &SchemaNode)> {
        self.graph.outgoing(id)
    }

    pub fn incoming(&self, id: RemoteId) -> Vec<(&SchemaEdge, &SchemaNode)> {
        self.graph.incoming(id)
    }
}
