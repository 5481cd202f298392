//! Client configuration

use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the remote facade and workflows
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL
    pub api_url: String,
    /// Token used to initialize the auth state on load
    pub token: Option<String>,
    /// Per-request transport timeout
    pub request_timeout: Duration,
    /// Queue a schema scan when a verified connection is committed
    pub scan_on_commit: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            scan_on_commit: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unparseable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_url: lookup("SCHEMACHAT_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_url),
            token: lookup("SCHEMACHAT_TOKEN").filter(|v| !v.is_empty()),
            request_timeout: lookup("SCHEMACHAT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
            scan_on_commit: lookup("SCHEMACHAT_SCAN_ON_COMMIT")
                .map_or(defaults.scan_on_commit, |v| parse_flag(&v)),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
