//! Remote Service Facade
//!
//! Typed request/response boundary to the backend. The workflows only see
//! the [`RemoteService`] trait, so they can be driven by [`HttpRemote`] in
//! production and by a mock in tests.

mod error;
mod http;
mod logging;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::{ApiError, ApiErrorKind};
pub use http::HttpRemote;
pub use logging::LoggingRemote;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Backend operations consumed by the client workflows
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Exchange credentials for an access token
    async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError>;

    /// Fetch the user the current token belongs to
    async fn current_user(&self) -> Result<UserProfile, ApiError>;

    /// Load a session with its full message list
    async fn get_session(&self, session_id: RemoteId) -> Result<SessionDetail, ApiError>;

    /// List session summaries, newest first
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;

    /// Start a new conversation with its first message
    async fn create_session(&self, request: &ChatRequest) -> Result<SessionDetail, ApiError>;

    /// Append a user turn; returns the assistant reply
    async fn post_message(
        &self,
        session_id: RemoteId,
        request: &ChatRequest,
    ) -> Result<WireMessage, ApiError>;

    /// List connections visible to the user
    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, ApiError>;

    /// Persist a connection record
    async fn create_connection(
        &self,
        request: &CreateConnectionRequest,
    ) -> Result<ConnectionRecord, ApiError>;

    /// Test reachability of a persisted connection
    async fn test_connection(&self, connection_id: RemoteId) -> Result<TestReport, ApiError>;

    /// Queue a background schema scan
    async fn scan_connection(&self, connection_id: RemoteId) -> Result<ScanReceipt, ApiError>;

    /// Fetch the schema graph of a connection
    async fn get_graph(&self, connection_id: RemoteId) -> Result<GraphPayload, ApiError>;
}

// ============================================================================
// Arc implementation for trait objects
// ============================================================================

#[async_trait]
impl<T: RemoteService + ?Sized> RemoteService for Arc<T> {
    async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError> {
        (**self).login(form).await
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        (**self).current_user().await
    }

    async fn get_session(&self, session_id: RemoteId) -> Result<SessionDetail, ApiError> {
        (**self).get_session(session_id).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        (**self).list_sessions().await
    }

    async fn create_session(&self, request: &ChatRequest) -> Result<SessionDetail, ApiError> {
        (**self).create_session(request).await
    }

    async fn post_message(
        &self,
        session_id: RemoteId,
        request: &ChatRequest,
    ) -> Result<WireMessage, ApiError> {
        (**self).post_message(session_id, request).await
    }

    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, ApiError> {
        (**self).list_connections().await
    }

    async fn create_connection(
        &self,
        request: &CreateConnectionRequest,
    ) -> Result<ConnectionRecord, ApiError> {
        (**self).create_connection(request).await
    }

    async fn test_connection(&self, connection_id: RemoteId) -> Result<TestReport, ApiError> {
        (**self).test_connection(connection_id).await
    }

    async fn scan_connection(&self, connection_id: RemoteId) -> Result<ScanReceipt, ApiError> {
        (**self).scan_connection(connection_id).await
    }

    async fn get_graph(&self, connection_id: RemoteId) -> Result<GraphPayload, ApiError> {
        (**self).get_graph(connection_id).await
    }
}
