//! Property-based tests for graph construction and selection

use super::*;
use crate::api::RemoteId;
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_ids() -> impl Strategy<Value = Vec<RemoteId>> {
    proptest::collection::hash_set(1i64..40, 0..12).prop_map(|ids| ids.into_iter().collect())
}

fn arb_edges() -> impl Strategy<Value = Vec<(RemoteId, RemoteId)>> {
    proptest::collection::vec((1i64..60, 1i64..60), 0..30)
}

fn nodes(ids: &[RemoteId]) -> Vec<SchemaNode> {
    ids.iter()
        .map(|&id| SchemaNode {
            id,
            name: format!("t{id}"),
            kind: NodeKind::Table,
            raw_metadata: None,
        })
        .collect()
}

fn edges(pairs: &[(RemoteId, RemoteId)]) -> Vec<SchemaEdge> {
    pairs
        .iter()
        .map(|&(source_id, target_id)| SchemaEdge {
            source_id,
            target_id,
            kind: "foreign_key".to_string(),
            raw_metadata: None,
        })
        .collect()
}

proptest! {
    #[test]
    fn dangling_edges_are_excluded_and_nodes_kept(ids in arb_ids(), pairs in arb_edges()) {
        let known: HashSet<RemoteId> = ids.iter().copied().collect();
        let resolvable = pairs
            .iter()
            .filter(|(s, t)| known.contains(s) && known.contains(t))
            .count();

        let report = build_graph(nodes(&ids), edges(&pairs));

        prop_assert_eq!(report.graph.node_count(), ids.len());
        prop_assert_eq!(report.graph.edge_count(), resolvable);
        prop_assert_eq!(report.dropped_edges, pairs.len() - resolvable);
        for edge in report.graph.edges() {
            prop_assert!(report.graph.contains(edge.source_id));
            prop_assert!(report.graph.contains(edge.target_id));
        }
    }

    #[test]
    fn selecting_absent_node_keeps_selection(ids in arb_ids(), absent in 40i64..80) {
        let report = build_graph(nodes(&ids), Vec::new());
        let mut explorer = GraphExplorer::with_graph(report.graph);
        if let Some(&first) = ids.first() {
            explorer.select_node(first);
        }
        let before = explorer.selected_node_id();

        explorer.select_node(absent);

        prop_assert_eq!(explorer.selected_node_id(), before);
    }
}
