//! Process-wide authentication state
//!
//! Explicit lifecycle: initialize on load, login, logout. The token is only
//! ever read through [`AuthState::token`]; the workflows never touch it.

use crate::api::{LoginForm, RemoteService, UserProfile};
use crate::error::{ClientError, ClientResult};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct AuthInner {
    token: Option<String>,
    user: Option<UserProfile>,
}

/// Shared handle to the authentication state
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    inner: Arc<RwLock<AuthInner>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize on load from a stored token, if any
    pub fn initialize(token: Option<String>) -> Self {
        let state = Self::new();
        if let Some(token) = token {
            state.login(token);
        }
        state
    }

    pub fn login(&self, token: impl Into<String>) {
        let mut inner = self.write();
        inner.token = Some(token.into());
        inner.user = None;
    }

    pub fn logout(&self) {
        let mut inner = self.write();
        inner.token = None;
        inner.user = None;
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    /// Exchange credentials for a token and store it
    pub async fn login_with_password<R: RemoteService + ?Sized>(
        &self,
        remote: &R,
        email: &str,
        password: &str,
    ) -> ClientResult<()> {
        let form = LoginForm {
            username: email.to_string(),
            password: password.to_string(),
        };
        let token = remote.login(&form).await?;
        self.login(token.access_token);
        tracing::info!(email, "Logged in");
        Ok(())
    }

    /// Fetch the current user; any failure logs out
    pub async fn refresh_user<R: RemoteService + ?Sized>(
        &self,
        remote: &R,
    ) -> ClientResult<UserProfile> {
        match remote.current_user().await {
            Ok(user) => {
                self.write().user = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch user, logging out");
                self.logout();
                Err(ClientError::from(e))
            }
        }
    }

    // Poisoning is ignored: every write leaves both fields consistent
    fn read(&self) -> std::sync::RwLockReadGuard<'_, AuthInner> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, AuthInner> {
        self.inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
