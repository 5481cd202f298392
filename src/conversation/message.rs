//! Conversation message types

use crate::api::{RemoteId, WireMessage};
use crate::error::ClientError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Message identity: provisional until the server assigns one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MessageId {
    /// Locally generated for an optimistic echo; never sent to the server
    Provisional(Uuid),
    /// Assigned by the server
    Server(RemoteId),
}

impl MessageId {
    pub fn provisional() -> Self {
        MessageId::Provisional(Uuid::new_v4())
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, MessageId::Provisional(_))
    }

    pub fn server_id(&self) -> Option<RemoteId> {
        match self {
            MessageId::Server(id) => Some(*id),
            MessageId::Provisional(_) => None,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Provisional(id) => write!(f, "local-{id}"),
            MessageId::Server(id) => write!(f, "{id}"),
        }
    }
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn from_wire(raw: &str) -> Self {
        match raw {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => {
                tracing::warn!(role = other, "Unknown message role, treating as assistant");
                Role::Assistant
            }
        }
    }
}

/// A message in a session, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// SQL derived from the question, carried by assistant replies
    pub derived_query: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Optimistic user message, stamped now
    pub fn provisional(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::provisional(),
            role: Role::User,
            content: content.into(),
            derived_query: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.id.is_provisional()
    }
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Self {
            id: MessageId::Server(wire.id),
            role: Role::from_wire(&wire.role),
            content: wire.content,
            derived_query: wire.sql_query.filter(|q| !q.trim().is_empty()),
            created_at: wire.created_at,
        }
    }
}

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: RemoteId,
    pub title: Option<String>,
    pub connection_id: Option<RemoteId>,
    pub messages: Vec<Message>,
    /// Gates the input control while a send is in flight
    pub busy: bool,
    /// Most recent send failure, cleared by the next successful send
    pub last_error: Option<ClientError>,
}
