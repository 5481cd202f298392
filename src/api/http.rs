//! HTTP implementation of the remote facade

use super::types::*;
use super::{ApiError, RemoteService};
use crate::auth::AuthState;
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Backend client over JSON/HTTP with bearer authentication
pub struct HttpRemote {
    client: Client,
    base_url: String,
    auth: AuthState,
}

impl HttpRemote {
    pub fn new(config: &ClientConfig, auth: AuthState) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorized(builder).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::transport(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                ApiError::transport(format!("Connection failed: {e}"))
            } else {
                ApiError::transport(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::transport(format!("Failed to parse response: {e} - body: {body}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.client.post(self.url(path))).await
    }
}

/// Map an HTTP failure onto the error taxonomy
///
/// FastAPI puts the reason in `detail` (a string, or a list of field errors
/// for 422); the global handler uses `message`.
pub(crate) fn classify_error(status: StatusCode, body: &str) -> ApiError {
    let reason = extract_reason(body).unwrap_or_else(|| body.to_string());
    let code = status.as_u16();
    let err = match code {
        400 | 422 => ApiError::validation(reason),
        401 | 403 => ApiError::unauthorized(format!("Authentication failed: {reason}")),
        404 => ApiError::not_found(reason),
        429 => ApiError::transport(format!("Rate limited: {reason}")),
        500..=599 => ApiError::transport(format!("Server error: {reason}")),
        _ => ApiError::transport(format!("HTTP {status}: {reason}")),
    };
    err.with_status(code)
}

fn extract_reason(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    match parsed.get("detail").or_else(|| parsed.get("message"))? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| {
                    let field = item
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string));
                    let msg = item.get("msg").and_then(Value::as_str).unwrap_or("invalid");
                    match field {
                        Some(field) => format!("{field}: {msg}"),
                        None => msg.to_string(),
                    }
                })
                .collect();
            Some(parts.join("; "))
        }
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    async fn login(&self, form: &LoginForm) -> Result<TokenResponse, ApiError> {
        // OAuth2 password flow expects a form body
        self.send(self.client.post(self.url("/auth/login")).form(form))
            .await
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.get("/auth/me").await
    }

    async fn get_session(&self, session_id: RemoteId) -> Result<SessionDetail, ApiError> {
        self.get(&format!("/chat/sessions/{session_id}")).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        self.get("/chat/sessions").await
    }

    async fn create_session(&self, request: &ChatRequest) -> Result<SessionDetail, ApiError> {
        self.post_json("/chat/sessions", request).await
    }

    async fn post_message(
        &self,
        session_id: RemoteId,
        request: &ChatRequest,
    ) -> Result<WireMessage, ApiError> {
        self.post_json(&format!("/chat/sessions/{session_id}/messages"), request)
            .await
    }

    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, ApiError> {
        self.get("/connections/").await
    }

    async fn create_connection(
        &self,
        request: &CreateConnectionRequest,
    ) -> Result<ConnectionRecord, ApiError> {
        self.post_json("/connections/", request).await
    }

    async fn test_connection(&self, connection_id: RemoteId) -> Result<TestReport, ApiError> {
        self.post_empty(&format!("/connections/{connection_id}/test"))
            .await
    }

    async fn scan_connection(&self, connection_id: RemoteId) -> Result<ScanReceipt, ApiError> {
        self.post_empty(&format!("/connections/{connection_id}/scan"))
            .await
    }

    async fn get_graph(&self, connection_id: RemoteId) -> Result<GraphPayload, ApiError> {
        self.get(&format!("/graph/{connection_id}")).await
    }
}
