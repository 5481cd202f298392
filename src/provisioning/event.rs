//! Events that drive the provisioning state machine

use super::state::{ConnectionDraft, ConnectionId};
use crate::error::ClientError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Verify { draft: ConnectionDraft },
    Edit,
    Commit,

    // Persist step
    ConnectionCreated { connection_id: ConnectionId },
    CreateFailed { error: ClientError },

    // Test step
    TestPassed { message: String },
    TestRejected { message: String },
    TestErrored { error: ClientError },

    // Verify future dropped mid-flight
    Interrupted,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Verify { .. } => "verify",
            Event::Edit => "edit",
            Event::Commit => "commit",
            Event::ConnectionCreated { .. } => "connection_created",
            Event::CreateFailed { .. } => "create_failed",
            Event::TestPassed { .. } => "test_passed",
            Event::TestRejected { .. } => "test_rejected",
            Event::TestErrored { .. } => "test_errored",
            Event::Interrupted => "interrupted",
        }
    }
}
