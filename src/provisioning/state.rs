//! Provisioning state types

use crate::api::{CreateConnectionRequest, RemoteId};
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned connection id; assigned means persisted
pub type ConnectionId = RemoteId;

// ============================================================================
// Draft
// ============================================================================

/// Database engine of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DbType {
    #[default]
    Postgresql,
    Mysql,
}

impl DbType {
    pub fn as_str(self) -> &'static str {
        match self {
            DbType::Postgresql => "postgresql",
            DbType::Mysql => "mysql",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            DbType::Postgresql => 5432,
            DbType::Mysql => 3306,
        }
    }
}

impl std::str::FromStr for DbType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DbType::Postgresql),
            "mysql" => Ok(DbType::Mysql),
            other => Err(ClientError::validation(format!(
                "unsupported database type: {other}"
            ))),
        }
    }
}

/// Connection form contents, local until verified
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDraft {
    pub name: String,
    pub db_type: DbType,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub secret: String,
    pub database_name: String,
}

impl Default for ConnectionDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            db_type: DbType::default(),
            host: String::new(),
            port: DbType::default().default_port(),
            username: String::new(),
            secret: String::new(),
            database_name: String::new(),
        }
    }
}

// Never print the secret
impl fmt::Debug for ConnectionDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDraft")
            .field("name", &self.name)
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("database_name", &self.database_name)
            .finish()
    }
}

impl ConnectionDraft {
    /// Check the fields the user can fix before anything is persisted
    pub fn validate(&self) -> ClientResult<()> {
        let mut problems = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("host", &self.host),
            ("username", &self.username),
            ("database_name", &self.database_name),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{field} is required"));
            }
        }
        if self.port == 0 {
            problems.push("port must be between 1 and 65535".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(problems.join("; ")))
        }
    }

    pub fn to_request(&self) -> CreateConnectionRequest {
        CreateConnectionRequest {
            name: self.name.trim().to_string(),
            db_type: self.db_type.as_str().to_string(),
            host: self.host.trim().to_string(),
            port: self.port,
            username: self.username.trim().to_string(),
            password: self.secret.clone(),
            database_name: self.database_name.trim().to_string(),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// Coarse verification status shown next to a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    Verifying,
    Verified,
    Failed,
}

/// Why a verification attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Persisting the record failed; nothing was created
    Persist,
    /// The server tested the record and reported failure
    TestRejected,
    /// The test call itself failed
    TestUnreachable,
    /// The caller abandoned the verification before it settled
    Interrupted,
}

/// Provisioning state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProvisionState {
    /// Editing the form; nothing in flight
    #[default]
    Draft,

    /// Persist-then-test round trip in flight
    Verifying {
        /// Assigned once the persist step succeeds
        connection_id: Option<ConnectionId>,
    },

    /// The server reached the database at least once
    Verified {
        connection_id: ConnectionId,
        message: String,
    },

    /// Verification failed; a persisted record stays behind if one was created
    Failed {
        connection_id: Option<ConnectionId>,
        reason: String,
        kind: FailureKind,
    },

    /// User confirmed a verified connection (terminal)
    Committed { connection_id: ConnectionId },
}

impl ProvisionState {
    pub fn verification_state(&self) -> VerificationState {
        match self {
            ProvisionState::Draft => VerificationState::Unverified,
            ProvisionState::Verifying { .. } => VerificationState::Verifying,
            ProvisionState::Verified { .. } | ProvisionState::Committed { .. } => {
                VerificationState::Verified
            }
            ProvisionState::Failed { .. } => VerificationState::Failed,
        }
    }

    /// Id of the persisted record, if one exists
    pub fn connection_id(&self) -> Option<ConnectionId> {
        match self {
            ProvisionState::Draft => None,
            ProvisionState::Verifying { connection_id }
            | ProvisionState::Failed { connection_id, .. } => *connection_id,
            ProvisionState::Verified { connection_id, .. }
            | ProvisionState::Committed { connection_id } => Some(*connection_id),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProvisionState::Committed { .. })
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self, ProvisionState::Verifying { .. })
    }

    pub fn can_commit(&self) -> bool {
        matches!(self, ProvisionState::Verified { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProvisionState::Draft => "draft",
            ProvisionState::Verifying { .. } => "verifying",
            ProvisionState::Verified { .. } => "verified",
            ProvisionState::Failed { .. } => "failed",
            ProvisionState::Committed { .. } => "committed",
        }
    }
}

/// Context for a provisioning flow (immutable configuration)
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionContext {
    /// Queue a schema scan as part of commit
    pub scan_on_commit: bool,
}
