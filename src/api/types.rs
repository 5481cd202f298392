//! Wire request and response types
//!
//! Shapes follow the backend's JSON. Conversions into the client-side
//! domain types live next to those types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier (opaque integer)
pub type RemoteId = i64;

// ============================================================================
// Auth
// ============================================================================

/// Form body for the login endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response from the login endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
}

/// The authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: RemoteId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

// ============================================================================
// Chat
// ============================================================================

/// A persisted chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: RemoteId,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub sql_query: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Full session with its messages (get/create session)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionDetail {
    pub id: RemoteId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub connection_id: Option<RemoteId>,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// Session list entry for the picker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSummary {
    pub id: RemoteId,
    #[serde(default)]
    pub title: Option<String>,
    pub connection_id: RemoteId,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Body for both session creation and posting a message
///
/// `connection_id` is ignored by the server for existing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub connection_id: RemoteId,
}

// ============================================================================
// Connections
// ============================================================================

/// A persisted connection (the secret is never echoed back)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionRecord {
    pub id: RemoteId,
    pub name: String,
    pub db_type: String,
    pub host: String,
    /// Stored unbounded server-side; may be out of the `u16` range
    pub port: i64,
    pub username: String,
    pub database_name: String,
    #[serde(default)]
    pub organization_id: Option<RemoteId>,
}

/// Body for connection creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    pub db_type: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database_name: String,
}

/// Result of testing a persisted connection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestReport {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl TestReport {
    /// Anything other than "success" is a failure (the backend reports "error")
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

/// Acknowledgement of a queued schema scan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanReceipt {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireNode {
    pub id: RemoteId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub metadata_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEdge {
    pub source_id: RemoteId,
    pub target_id: RemoteId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub metadata_json: Option<String>,
}

/// Schema graph for one connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub edges: Vec<WireEdge>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Accept RFC 3339 or a naive ISO timestamp (the backend emits naive UTC)
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
