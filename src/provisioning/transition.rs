//! Pure state transition function
//!
//! Two-phase verify: persist the record, then test it by id. The backend
//! has no validate-without-persisting call, so a failed test leaves a
//! persisted record behind; it is recorded as an orphan, not deleted.

use super::{Effect, Event, ProvisionContext, ProvisionState};
use super::state::FailureKind;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ProvisionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ProvisionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Verification already in progress")]
    AlreadyInProgress,
    #[error("Connection must pass verification before it can be committed")]
    NotVerified,
    #[error("Invalid connection details: {0}")]
    InvalidDraft(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &ProvisionState,
    context: &ProvisionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Verify
        // ============================================================

        // A second verify while one is in flight never starts another round trip
        (ProvisionState::Verifying { .. }, Event::Verify { .. }) => {
            Err(TransitionError::AlreadyInProgress)
        }

        (ProvisionState::Committed { .. }, Event::Verify { .. }) => Err(
            TransitionError::InvalidTransition("connection already committed".to_string()),
        ),

        // Draft / Failed / Verified + Verify -> Verifying, persist first
        (current, Event::Verify { draft }) => {
            if let Err(e) = draft.validate() {
                return Err(TransitionError::InvalidDraft(validation_message(e)));
            }
            // Re-verifying a verified record abandons it; a failed one was
            // already recorded when it failed
            let superseded = match current {
                ProvisionState::Verified { connection_id, .. } => Some(Effect::orphan(*connection_id)),
                _ => None,
            };
            Ok(
                TransitionResult::new(ProvisionState::Verifying {
                    connection_id: None,
                })
                .with_effects(superseded)
                .with_effect(Effect::create(draft)),
            )
        }

        // ============================================================
        // Persist step
        // ============================================================
        (
            ProvisionState::Verifying {
                connection_id: None,
            },
            Event::ConnectionCreated { connection_id },
        ) => Ok(TransitionResult::new(ProvisionState::Verifying {
            connection_id: Some(connection_id),
        })
        .with_effect(Effect::test(connection_id))),

        // Persist failed -> Failed, never proceeds to test
        (
            ProvisionState::Verifying {
                connection_id: None,
            },
            Event::CreateFailed { error },
        ) => Ok(TransitionResult::new(ProvisionState::Failed {
            connection_id: None,
            reason: error.to_string(),
            kind: FailureKind::Persist,
        })),

        // ============================================================
        // Test step
        // ============================================================
        (
            ProvisionState::Verifying {
                connection_id: Some(id),
            },
            Event::TestPassed { message },
        ) => Ok(TransitionResult::new(ProvisionState::Verified {
            connection_id: *id,
            message,
        })),

        (
            ProvisionState::Verifying {
                connection_id: Some(id),
            },
            Event::TestRejected { message },
        ) => Ok(TransitionResult::new(ProvisionState::Failed {
            connection_id: Some(*id),
            reason: message,
            kind: FailureKind::TestRejected,
        })
        .with_effect(Effect::orphan(*id))),

        (
            ProvisionState::Verifying {
                connection_id: Some(id),
            },
            Event::TestErrored { error },
        ) => Ok(TransitionResult::new(ProvisionState::Failed {
            connection_id: Some(*id),
            reason: error.to_string(),
            kind: FailureKind::TestUnreachable,
        })
        .with_effect(Effect::orphan(*id))),

        // An abandoned verify settles as failed; a record persisted before
        // the drop is left behind
        (ProvisionState::Verifying { connection_id }, Event::Interrupted) => Ok(
            TransitionResult::new(ProvisionState::Failed {
                connection_id: *connection_id,
                reason: "verification interrupted".to_string(),
                kind: FailureKind::Interrupted,
            })
            .with_effects(connection_id.map(Effect::orphan)),
        ),

        // ============================================================
        // Commit - reachable only from Verified
        // ============================================================
        (ProvisionState::Verified { connection_id, .. }, Event::Commit) => {
            let result = TransitionResult::new(ProvisionState::Committed {
                connection_id: *connection_id,
            });
            if context.scan_on_commit {
                Ok(result.with_effect(Effect::ScanSchema {
                    connection_id: *connection_id,
                }))
            } else {
                Ok(result)
            }
        }

        (ProvisionState::Verifying { .. }, Event::Commit) => {
            Err(TransitionError::AlreadyInProgress)
        }

        (ProvisionState::Committed { .. }, Event::Commit) => Err(
            TransitionError::InvalidTransition("connection already committed".to_string()),
        ),

        (ProvisionState::Draft | ProvisionState::Failed { .. }, Event::Commit) => {
            Err(TransitionError::NotVerified)
        }

        // ============================================================
        // Edit - any change invalidates a previous verification
        // ============================================================
        (ProvisionState::Draft | ProvisionState::Failed { .. }, Event::Edit) => {
            Ok(TransitionResult::new(ProvisionState::Draft))
        }

        (ProvisionState::Verified { connection_id, .. }, Event::Edit) => {
            Ok(TransitionResult::new(ProvisionState::Draft).with_effect(Effect::orphan(*connection_id)))
        }

        (ProvisionState::Verifying { .. }, Event::Edit) => Err(TransitionError::AlreadyInProgress),

        (ProvisionState::Committed { .. }, Event::Edit) => Err(
            TransitionError::InvalidTransition("connection already committed".to_string()),
        ),

        // ============================================================
        // Remote results that do not match the current step
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} in state {}",
            event.name(),
            state.name()
        ))),
    }
}

fn validation_message(err: crate::error::ClientError) -> String {
    match err {
        crate::error::ClientError::Validation(msg) => msg,
        other => other.to_string(),
    }
}
