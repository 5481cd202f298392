//! Mock remote facade for testing
//!
//! Queued responses per call, plus a record of every request made.

use super::types::*;
use super::{ApiError, RemoteService};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Login(String),
    CurrentUser,
    GetSession(RemoteId),
    ListSessions,
    CreateSession(ChatRequest),
    PostMessage(RemoteId, ChatRequest),
    ListConnections,
    CreateConnection(CreateConnectionRequest),
    TestConnection(RemoteId),
    ScanConnection(RemoteId),
    GetGraph(RemoteId),
}

type Queue<T> = Mutex<VecDeque<Result<T, ApiError>>>;

/// Mock remote that returns queued responses in order
#[derive(Default)]
pub struct MockRemote {
    logins: Queue<TokenResponse>,
    users: Queue<UserProfile>,
    sessions: Queue<SessionDetail>,
    session_lists: Queue<Vec<SessionSummary>>,
    created_sessions: Queue<SessionDetail>,
    replies: Queue<WireMessage>,
    connection_lists: Queue<Vec<ConnectionRecord>>,
    created_connections: Queue<ConnectionRecord>,
    test_reports: Queue<TestReport>,
    scans: Queue<ScanReceipt>,
    graphs: Queue<GraphPayload>,
    /// Yield to the scheduler before answering, so callers can interleave
    yield_first: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

fn pop<T>(queue: &Queue<T>, call: &str) -> Result<T, ApiError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ApiError::transport(format!("No mock response queued for {call}"))))
}

fn push<T>(queue: &Queue<T>, value: Result<T, ApiError>) {
    queue.lock().unwrap().push_back(value);
}

#[allow(dead_code)]
impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield once before every reply
    pub fn yielding() -> Self {
        Self {
            yield_first: true,
            ..Self::default()
        }
    }

    pub fn queue_login(&self, result: Result<TokenResponse, ApiError>) {
        push(&self.logins, result);
    }

    pub fn queue_user(&self, result: Result<UserProfile, ApiError>) {
        push(&self.users, result);
    }

    pub fn queue_session(&self, result: Result<SessionDetail, ApiError>) {
        push(&self.sessions, result);
    }

    pub fn queue_session_list(&self, result: Result<Vec<SessionSummary>, ApiError>) {
        push(&self.session_lists, result);
    }

    pub fn queue_created_session(&self, result: Result<SessionDetail, ApiError>) {
        push(&self.created_sessions, result);
    }

    pub fn queue_reply(&self, result: Result<WireMessage, ApiError>) {
        push(&self.replies, result);
    }

    pub fn queue_connection_list(&self, result: Result<Vec<ConnectionRecord>, ApiError>) {
        push(&self.connection_lists, result);
    }

    pub fn queue_created_connection(&self, result: Result<ConnectionRecord, ApiError>) {
        push(&self.created_connections, result);
    }

    pub fn queue_test_report(&self, result: Result<TestReport, ApiError>) {
        push(&self.test_reports, result);
    }

    pub fn queue_scan(&self, result: Result<ScanReceipt, ApiError>) {
        push(&self.scans, result);
    }

    pub fn queue_graph(&self, result: Result<GraphPayload, ApiError>) {
        push(&self.graphs, result);
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Count recorded calls matching a predicate
    pub fn count_calls(&self, pred: impl Fn(&RecordedCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
        if self.yield_first {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl RemoteService for MockRemote {
    async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError> {
        self.record(RecordedCall::Login(form.username.clone())).await;
        pop(&self.logins, "login")
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.record(RecordedCall::CurrentUser).await;
        pop(&self.users, "current_user")
    }

    async fn get_session(&self, session_id: RemoteId) -> Result<SessionDetail, ApiError> {
        self.record(RecordedCall::GetSession(session_id)).await;
        pop(&self.sessions, "get_session")
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        self.record(RecordedCall::ListSessions).await;
        pop(&self.session_lists, "list_sessions")
    }

    async fn create_session(&self, request: &ChatRequest) -> Result<SessionDetail, ApiError> {
        self.record(RecordedCall::CreateSession(request.clone())).await;
        pop(&self.created_sessions, "create_session")
    }

    async fn post_message(
        &self,
        session_id: RemoteId,
        request: &ChatRequest,
    ) -> Result<WireMessage, ApiError> {
        self.record(RecordedCall::PostMessage(session_id, request.clone()))
            .await;
        pop(&self.replies, "post_message")
    }

    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, ApiError> {
        self.record(RecordedCall::ListConnections).await;
        pop(&self.connection_lists, "list_connections")
    }

    async fn create_connection(
        &self,
        request: &CreateConnectionRequest,
    ) -> Result<ConnectionRecord, ApiError> {
        self.record(RecordedCall::CreateConnection(request.clone()))
            .await;
        pop(&self.created_connections, "create_connection")
    }

    async fn test_connection(&self, connection_id: RemoteId) -> Result<TestReport, ApiError> {
        self.record(RecordedCall::TestConnection(connection_id)).await;
        pop(&self.test_reports, "test_connection")
    }

    async fn scan_connection(&self, connection_id: RemoteId) -> Result<ScanReceipt, ApiError> {
        self.record(RecordedCall::ScanConnection(connection_id)).await;
        pop(&self.scans, "scan_connection")
    }

    async fn get_graph(&self, connection_id: RemoteId) -> Result<GraphPayload, ApiError> {
        self.record(RecordedCall::GetGraph(connection_id)).await;
        pop(&self.graphs, "get_graph")
    }
}

// ============================================================================
// Fixture builders
// ============================================================================

#[allow(dead_code)]
pub fn wire_message(id: RemoteId, role: &str, content: &str, sql: Option<&str>) -> WireMessage {
    WireMessage {
        id,
        role: role.to_string(),
        content: content.to_string(),
        sql_query: sql.map(str::to_string),
        created_at: Utc::now(),
    }
}

#[allow(dead_code)]
pub fn connection_record(id: RemoteId, name: &str) -> ConnectionRecord {
    ConnectionRecord {
        id,
        name: name.to_string(),
        db_type: "postgresql".to_string(),
        host: "db.example.com".to_string(),
        port: 5432,
        username: "app".to_string(),
        database_name: "app".to_string(),
        organization_id: Some(1),
    }
}

#[allow(dead_code)]
pub fn test_report(status: &str, message: &str) -> TestReport {
    TestReport {
        status: status.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_queued_then_errors() {
        let mock = MockRemote::new();
        mock.queue_test_report(Ok(test_report("success", "Connection successful")));

        let report = mock.test_connection(3).await.unwrap();
        assert!(report.succeeded());

        // Second call should fail (nothing queued)
        let result = mock.test_connection(3).await;
        assert!(result.is_err());
        assert_eq!(
            mock.recorded_calls(),
            vec![RecordedCall::TestConnection(3), RecordedCall::TestConnection(3)]
        );
    }
}
