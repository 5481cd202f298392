//! Conversation Session Manager
//!
//! Owns one session's message list and keeps it consistent across
//! send/receive round trips: optimistic echo first, server reply appended
//! on success, nothing rolled back on failure.

mod message;
mod reconcile;

#[cfg(test)]
mod proptests;

pub use message::{Message, MessageId, Role, SessionSnapshot};
pub use reconcile::{append_provisional, reconcile_reply, Reconciliation};

use crate::api::{ChatRequest, RemoteId, RemoteService, SessionDetail, SessionSummary};
use crate::error::{ClientError, ClientResult};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Placeholder connection id for posts to an existing session (ignored by the server)
const EXISTING_SESSION_CONNECTION: RemoteId = 0;

#[derive(Debug)]
struct SessionView {
    session_id: RemoteId,
    title: Option<String>,
    connection_id: Option<RemoteId>,
    messages: Vec<Message>,
    busy: bool,
    last_error: Option<ClientError>,
}

impl SessionView {
    fn empty(session_id: RemoteId) -> Self {
        Self {
            session_id,
            title: None,
            connection_id: None,
            messages: Vec::new(),
            busy: false,
            last_error: None,
        }
    }

    fn replace_with(&mut self, detail: SessionDetail) {
        self.session_id = detail.id;
        self.title = detail.title;
        self.connection_id = detail.connection_id;
        self.messages = detail.messages.into_iter().map(Message::from).collect();
        self.last_error = None;
    }
}

/// Message history for one session, exclusively owned for the life of the view
pub struct SessionManager<R: RemoteService> {
    remote: R,
    view: Mutex<SessionView>,
}

impl<R: RemoteService> SessionManager<R> {
    /// Manager for a known session id, with no messages loaded yet
    pub fn new(remote: R, session_id: RemoteId) -> Self {
        Self {
            remote,
            view: Mutex::new(SessionView::empty(session_id)),
        }
    }

    /// Create a manager and load the session in one step
    pub async fn open(remote: R, session_id: RemoteId) -> ClientResult<Self> {
        let manager = Self::new(remote, session_id);
        manager.load_session(session_id).await?;
        Ok(manager)
    }

    /// Start a brand-new session against a connection
    ///
    /// There is no optimistic session id: the manager only exists once the
    /// server has confirmed creation.
    pub async fn create_session(
        remote: R,
        connection_id: RemoteId,
        first_message: &str,
    ) -> ClientResult<Self> {
        let text = first_message.trim();
        if text.is_empty() {
            return Err(ClientError::validation("message must not be empty"));
        }
        if connection_id <= 0 {
            return Err(ClientError::validation("a connection must be selected"));
        }

        let request = ChatRequest {
            message: text.to_string(),
            connection_id,
        };
        let detail = remote.create_session(&request).await?;
        tracing::info!(
            session_id = detail.id,
            connection_id,
            messages = detail.messages.len(),
            "Session created"
        );

        let manager = Self::new(remote, detail.id);
        manager.lock().replace_with(detail);
        Ok(manager)
    }

    /// Fetch and replace the full message list
    ///
    /// On failure the prior state is left untouched. Rejected while a send
    /// is in flight, since its reply would land in the replaced list.
    pub async fn load_session(&self, session_id: RemoteId) -> ClientResult<()> {
        if self.lock().busy {
            return Err(ClientError::AlreadyInProgress);
        }

        let detail = self.remote.get_session(session_id).await.map_err(|e| {
            tracing::warn!(session_id, error = %e, "Failed to load session");
            ClientError::from(e)
        })?;

        let mut view = self.lock();
        if view.busy {
            return Err(ClientError::AlreadyInProgress);
        }
        view.replace_with(detail);
        tracing::debug!(session_id, messages = view.messages.len(), "Session loaded");
        Ok(())
    }

    /// Send a user turn
    ///
    /// Returns `Ok(None)` without any remote call for blank text. Otherwise
    /// the optimistic message is visible before the remote call resolves;
    /// on failure it stays visible and the error is returned and recorded.
    pub async fn send_message(&self, text: &str) -> ClientResult<Option<Message>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let (session_id, provisional) = {
            let mut view = self.lock();
            if view.busy {
                return Err(ClientError::AlreadyInProgress);
            }
            view.busy = true;
            let provisional = append_provisional(&mut view.messages, text);
            (view.session_id, provisional)
        };
        let _busy = BusyGuard { view: &self.view };

        let request = ChatRequest {
            message: text.to_string(),
            connection_id: EXISTING_SESSION_CONNECTION,
        };
        let result = self.remote.post_message(session_id, &request).await;

        let mut view = self.lock();
        match result {
            Ok(wire) => {
                let reply = Message::from(wire);
                let outcome = reconcile_reply(&mut view.messages, provisional, reply.clone());
                view.last_error = None;
                tracing::debug!(session_id, ?outcome, "Reply reconciled");
                Ok(Some(reply))
            }
            Err(e) => {
                let err = ClientError::from(e);
                tracing::warn!(session_id, error = %err, "Send failed, keeping optimistic message");
                view.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn session_id(&self) -> RemoteId {
        self.lock().session_id
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let view = self.lock();
        SessionSnapshot {
            session_id: view.session_id,
            title: view.title.clone(),
            connection_id: view.connection_id,
            messages: view.messages.clone(),
            busy: view.busy,
            last_error: view.last_error.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionView> {
        lock_view(&self.view)
    }
}

fn lock_view(view: &Mutex<SessionView>) -> MutexGuard<'_, SessionView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the busy flag when a send ends, including when its future is dropped
struct BusyGuard<'a> {
    view: &'a Mutex<SessionView>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock_view(self.view).busy = false;
    }
}

/// Sessions for the picker, newest first as the server orders them
pub async fn list_sessions<R: RemoteService + ?Sized>(remote: &R) -> ClientResult<Vec<SessionSummary>> {
    let sessions = remote.list_sessions().await?;
    tracing::debug!(count = sessions.len(), "Sessions listed");
    Ok(sessions)
}
