//! Connection provisioning state machine
//!
//! Pure transitions (`transition`) plus an executor (`Provisioner`) that
//! performs the persist-then-test round trip against the remote service.

mod effect;
pub mod event;
mod executor;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use executor::{CommitOutcome, Provisioner};
pub use state::{
    ConnectionDraft, ConnectionId, DbType, FailureKind, ProvisionContext, ProvisionState,
    VerificationState,
};
pub use transition::{transition, TransitionError, TransitionResult};

use crate::api::{ConnectionRecord, RemoteService};
use crate::error::ClientResult;

/// Connections for the selector
pub async fn list_connections<R: RemoteService + ?Sized>(
    remote: &R,
) -> ClientResult<Vec<ConnectionRecord>> {
    let connections = remote.list_connections().await?;
    tracing::debug!(count = connections.len(), "Connections listed");
    Ok(connections)
}
