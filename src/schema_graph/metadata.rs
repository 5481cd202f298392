//! Best-effort parsing of node and edge metadata
//!
//! Metadata is descriptive only. Anything malformed yields nothing rather
//! than an error.

use super::model::{SchemaEdge, SchemaNode};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub source_column: String,
    pub target_column: String,
}

#[derive(Deserialize)]
struct RawNodeMetadata {
    #[serde(default)]
    columns: Vec<Value>,
}

#[derive(Deserialize)]
struct RawForeignKey {
    source_column: String,
    target_column: String,
}

/// Columns described in a node's metadata; empty when absent or malformed
pub fn columns_of(node: &SchemaNode) -> Vec<ColumnInfo> {
    let Some(raw) = node.raw_metadata.as_deref() else {
        return Vec::new();
    };
    let metadata: RawNodeMetadata = match serde_json::from_str(raw) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(node_id = node.id, error = %e, "Unreadable node metadata");
            return Vec::new();
        }
    };

    metadata.columns.iter().filter_map(column_info).collect()
}

// Each field is read on its own; an unreadable one falls back to its default
fn column_info(value: &Value) -> Option<ColumnInfo> {
    let column = value.as_object()?;
    let name = column
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())?;
    Some(ColumnInfo {
        name: name.to_string(),
        data_type: column
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        nullable: column.get("nullable").is_none_or(parse_nullable),
    })
}

/// `information_schema` reports "YES"/"NO"; other sources use booleans
fn parse_nullable(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().eq_ignore_ascii_case("no"),
        _ => true,
    }
}

/// Column pair of a foreign-key edge, if its metadata names one
pub fn foreign_key_of(edge: &SchemaEdge) -> Option<ForeignKeyInfo> {
    let raw = edge.raw_metadata.as_deref()?;
    let fk: RawForeignKey = serde_json::from_str(raw).ok()?;
    Some(ForeignKeyInfo {
        source_column: fk.source_column,
        target_column: fk.target_column,
    })
}
