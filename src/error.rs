//! Workflow error taxonomy
//!
//! Every remote failure is caught at the workflow boundary and turned into
//! one of these kinds. None of them escape as panics.

use crate::api::{ApiError, ApiErrorKind};
use crate::provisioning::TransitionError;
use thiserror::Error;

/// Errors surfaced by the conversation, provisioning and graph workflows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Malformed input, fixable by the user (shown inline)
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Referenced session, connection or graph does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Network or server failure, retryable by repeating the action
    #[error("Transport error: {0}")]
    Transport(String),
    /// Concurrency guard rejection; the action is already visibly pending
    #[error("Operation already in progress")]
    AlreadyInProgress,
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether re-invoking the same user action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the UI should ignore this error (the pending action is already visible)
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::AlreadyInProgress)
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            ApiErrorKind::Validation => ClientError::Validation(err.message),
            ApiErrorKind::NotFound => ClientError::NotFound(err.message),
            ApiErrorKind::Unauthorized => {
                ClientError::Transport(format!("authentication required: {}", err.message))
            }
            ApiErrorKind::Transport => ClientError::Transport(err.message),
        }
    }
}

impl From<TransitionError> for ClientError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyInProgress => ClientError::AlreadyInProgress,
            other => ClientError::Validation(other.to_string()),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
