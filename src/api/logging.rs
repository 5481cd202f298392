//! Logging wrapper for the remote facade

use super::types::*;
use super::{ApiError, RemoteService};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Logs name, duration and outcome of every remote call
pub struct LoggingRemote {
    inner: Arc<dyn RemoteService>,
}

impl LoggingRemote {
    pub fn new(inner: Arc<dyn RemoteService>) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(call: &'static str, start: Instant, result: &Result<T, ApiError>) {
    let duration = start.elapsed();
    match result {
        Ok(_) => {
            tracing::debug!(
                call,
                duration_ms = %duration.as_millis(),
                "Remote call completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                call,
                duration_ms = %duration.as_millis(),
                kind = e.kind.as_str(),
                status = ?e.status,
                error = %e.message,
                retryable = e.is_retryable(),
                "Remote call failed"
            );
        }
    }
}

#[async_trait]
impl RemoteService for LoggingRemote {
    async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError> {
        let start = Instant::now();
        let result = self.inner.login(form).await;
        log_outcome("login", start, &result);
        result
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        let start = Instant::now();
        let result = self.inner.current_user().await;
        log_outcome("current_user", start, &result);
        result
    }

    async fn get_session(&self, session_id: RemoteId) -> Result<SessionDetail, ApiError> {
        let start = Instant::now();
        let result = self.inner.get_session(session_id).await;
        log_outcome("get_session", start, &result);
        result
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let start = Instant::now();
        let result = self.inner.list_sessions().await;
        log_outcome("list_sessions", start, &result);
        result
    }

    async fn create_session(&self, request: &ChatRequest) -> Result<SessionDetail, ApiError> {
        let start = Instant::now();
        let result = self.inner.create_session(request).await;
        log_outcome("create_session", start, &result);
        result
    }

    async fn post_message(
        &self,
        session_id: RemoteId,
        request: &ChatRequest,
    ) -> Result<WireMessage, ApiError> {
        let start = Instant::now();
        let result = self.inner.post_message(session_id, request).await;
        log_outcome("post_message", start, &result);
        result
    }

    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, ApiError> {
        let start = Instant::now();
        let result = self.inner.list_connections().await;
        log_outcome("list_connections", start, &result);
        result
    }

    async fn create_connection(
        &self,
        request: &CreateConnectionRequest,
    ) -> Result<ConnectionRecord, ApiError> {
        let start = Instant::now();
        let result = self.inner.create_connection(request).await;
        log_outcome("create_connection", start, &result);
        result
    }

    async fn test_connection(&self, connection_id: RemoteId) -> Result<TestReport, ApiError> {
        let start = Instant::now();
        let result = self.inner.test_connection(connection_id).await;
        log_outcome("test_connection", start, &result);
        result
    }

    async fn scan_connection(&self, connection_id: RemoteId) -> Result<ScanReceipt, ApiError> {
        let start = Instant::now();
        let result = self.inner.scan_connection(connection_id).await;
        log_outcome("scan_connection", start, &result);
        result
    }

    async fn get_graph(&self, connection_id: RemoteId) -> Result<GraphPayload, ApiError> {
        let start = Instant::now();
        let result = self.inner.get_graph(connection_id).await;
        if let Ok(graph) = &result {
            tracing::debug!(
                connection_id,
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                "Graph payload received"
            );
        }
        log_outcome("get_graph", start, &result);
        result
    }
}
