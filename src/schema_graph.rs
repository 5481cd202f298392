//! Schema graph model and exploration controller

mod explorer;
mod metadata;
mod model;

#[cfg(test)]
mod proptests;

pub use explorer::GraphExplorer;
pub use metadata::{columns_of, foreign_key_of, ColumnInfo, ForeignKeyInfo};
pub use model::{build_graph, BuildReport, NodeKind, SchemaEdge, SchemaGraph, SchemaNode};
