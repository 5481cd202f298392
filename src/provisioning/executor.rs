//! Provisioning executor
//!
//! Runs the effects the pure transition asks for and feeds the resulting
//! events back in until the machine settles. The state lock is never held
//! across a remote call.

use super::state::{ConnectionDraft, ConnectionId, VerificationState};
use super::{transition, Effect, Event, ProvisionContext, ProvisionState};
use crate::api::{RemoteService, ScanReceipt};
use crate::error::{ClientError, ClientResult};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub connection_id: ConnectionId,
    /// Present only when a scan was queued as part of the commit
    pub scan: Option<Result<ScanReceipt, ClientError>>,
}

#[derive(Debug, Default)]
struct Inner {
    state: ProvisionState,
    draft: ConnectionDraft,
    orphaned: Vec<ConnectionId>,
    last_scan: Option<Result<ScanReceipt, ClientError>>,
    verify_attempt: u64,
}

/// One connection form's verify-then-commit workflow
pub struct Provisioner<R: RemoteService> {
    remote: R,
    context: ProvisionContext,
    inner: Mutex<Inner>,
}

impl<R: RemoteService> Provisioner<R> {
    pub fn new(remote: R, context: ProvisionContext, draft: ConnectionDraft) -> Self {
        Self {
            remote,
            context,
            inner: Mutex::new(Inner {
                draft,
                ..Inner::default()
            }),
        }
    }

    pub fn state(&self) -> ProvisionState {
        self.lock().state.clone()
    }

    pub fn verification_state(&self) -> VerificationState {
        self.lock().state.verification_state()
    }

    pub fn draft(&self) -> ConnectionDraft {
        self.lock().draft.clone()
    }

    /// Persisted records this workflow abandoned; they are never deleted
    pub fn orphaned_connections(&self) -> Vec<ConnectionId> {
        self.lock().orphaned.clone()
    }

    /// Change the form; any change invalidates a previous verification
    pub fn edit_draft(&self, edit: impl FnOnce(&mut ConnectionDraft)) -> ClientResult<()> {
        let mut inner = self.lock();
        let effects = self.apply(&mut inner, Event::Edit)?;
        record_orphans(&mut inner, effects);
        edit(&mut inner.draft);
        Ok(())
    }

    /// Persist the draft, then test it
    ///
    /// A failed verification is a state, not an error: it comes back as
    /// `Ok(ProvisionState::Failed { .. })`. Errors are reserved for
    /// rejected actions (invalid draft, already verifying, already committed).
    ///
    /// Dropping the future before it resolves settles the workflow as
    /// `Failed { kind: Interrupted }`.
    pub async fn verify(&self) -> ClientResult<ProvisionState> {
        let (effects, attempt) = {
            let mut inner = self.lock();
            let draft = inner.draft.clone();
            let effects = self.apply(&mut inner, Event::Verify { draft })?;
            inner.verify_attempt += 1;
            (effects, inner.verify_attempt)
        };
        let _interrupt = InterruptGuard {
            provisioner: self,
            attempt,
        };

        self.run_effects(effects).await?;
        Ok(self.state())
    }

    /// Confirm a verified connection
    pub async fn commit(&self) -> ClientResult<CommitOutcome> {
        let effects = {
            let mut inner = self.lock();
            inner.last_scan = None;
            self.apply(&mut inner, Event::Commit)?
        };
        self.run_effects(effects).await?;

        let mut inner = self.lock();
        let connection_id = inner
            .state
            .connection_id()
            .ok_or_else(|| ClientError::validation("committed without a connection id"))?;
        Ok(CommitOutcome {
            connection_id,
            scan: inner.last_scan.take(),
        })
    }

    fn apply(&self, inner: &mut Inner, event: Event) -> ClientResult<Vec<Effect>> {
        let event_name = event.name();
        let result = transition(&inner.state, &self.context, event).inspect_err(|e| {
            tracing::debug!(event = event_name, state = inner.state.name(), error = %e, "Transition rejected");
        })?;
        tracing::debug!(
            event = event_name,
            from = inner.state.name(),
            to = result.new_state.name(),
            "Provisioning transition"
        );
        inner.state = result.new_state;
        Ok(result.effects)
    }

    /// Execute effects in order, applying each resulting event before the next effect
    async fn run_effects(&self, effects: Vec<Effect>) -> ClientResult<()> {
        let mut pending: Vec<Effect> = effects.into_iter().rev().collect();

        while let Some(effect) = pending.pop() {
            if let Some(event) = self.execute_effect(effect).await {
                let next = self.apply(&mut self.lock(), event)?;
                pending.extend(next.into_iter().rev());
            }
        }

        Ok(())
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::CreateConnection { draft } => {
                match self.remote.create_connection(&draft.to_request()).await {
                    Ok(record) => {
                        tracing::info!(connection_id = record.id, name = %record.name, "Connection persisted");
                        Some(Event::ConnectionCreated {
                            connection_id: record.id,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to persist connection");
                        Some(Event::CreateFailed {
                            error: ClientError::from(e),
                        })
                    }
                }
            }

            Effect::TestConnection { connection_id } => {
                match self.remote.test_connection(connection_id).await {
                    Ok(report) if report.succeeded() => {
                        tracing::info!(connection_id, "Connection test passed");
                        Some(Event::TestPassed {
                            message: report.message,
                        })
                    }
                    Ok(report) => {
                        tracing::info!(connection_id, status = %report.status, reason = %report.message, "Connection test failed");
                        Some(Event::TestRejected {
                            message: report.message,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(connection_id, error = %e, "Connection test call failed");
                        Some(Event::TestErrored {
                            error: ClientError::from(e),
                        })
                    }
                }
            }

            Effect::RecordOrphan { connection_id } => {
                record_orphan(&mut self.lock(), connection_id);
                None
            }

            Effect::ScanSchema { connection_id } => {
                let result = self
                    .remote
                    .scan_connection(connection_id)
                    .await
                    .map_err(ClientError::from);
                match &result {
                    Ok(receipt) => {
                        tracing::info!(connection_id, status = %receipt.status, "Schema scan queued");
                    }
                    Err(e) => {
                        tracing::warn!(connection_id, error = %e, "Schema scan failed, commit stands");
                    }
                }
                self.lock().last_scan = Some(result);
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn record_orphans(inner: &mut Inner, effects: Vec<Effect>) {
    for effect in effects {
        if let Effect::RecordOrphan { connection_id } = effect {
            record_orphan(inner, connection_id);
        }
    }
}

fn record_orphan(inner: &mut Inner, connection_id: ConnectionId) {
    if !inner.orphaned.contains(&connection_id) {
        tracing::warn!(connection_id, "Persisted connection left behind");
        inner.orphaned.push(connection_id);
    }
}

/// Settles a verification whose future was dropped before it finished
struct InterruptGuard<'a, R: RemoteService> {
    provisioner: &'a Provisioner<R>,
    attempt: u64,
}

impl<R: RemoteService> Drop for InterruptGuard<'_, R> {
    fn drop(&mut self) {
        let mut inner = self.provisioner.lock();
        if inner.verify_attempt != self.attempt || !inner.state.is_verifying() {
            return;
        }
        tracing::warn!(connection_id = ?inner.state.connection_id(), "Verification dropped before it settled");
        match self.provisioner.apply(&mut inner, Event::Interrupted) {
            Ok(effects) => record_orphans(&mut inner, effects),
            Err(e) => tracing::warn!(error = %e, "Interrupted verification left unsettled"),
        }
    }
}
