//! Effects produced by state transitions

use super::state::{ConnectionDraft, ConnectionId};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the connection record (verify step a)
    CreateConnection { draft: ConnectionDraft },

    /// Test the persisted record (verify step b)
    TestConnection { connection_id: ConnectionId },

    /// A persisted record was abandoned; keep it in the ledger
    RecordOrphan { connection_id: ConnectionId },

    /// Queue a schema scan for a committed connection
    ScanSchema { connection_id: ConnectionId },
}

impl Effect {
    pub fn create(draft: ConnectionDraft) -> Self {
        Effect::CreateConnection { draft }
    }

    pub fn test(connection_id: ConnectionId) -> Self {
        Effect::TestConnection { connection_id }
    }

    pub fn orphan(connection_id: ConnectionId) -> Self {
        Effect::RecordOrphan { connection_id }
    }
}
