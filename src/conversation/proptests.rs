//! Property-based tests for the session manager
//!
//! Optimism precedes confirmation, blank input is inert, failure never shrinks.

use super::*;
use crate::api::testing::{wire_message, MockRemote, RecordedCall};
use crate::api::ApiError;
use proptest::prelude::*;
use std::sync::Arc;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n\r]{0,12}"
}

fn arb_text() -> impl Strategy<Value = String> {
    ("[ \t]{0,3}", "[a-zA-Z0-9?*,. ]{0,30}[a-zA-Z0-9?]", "[ \n]{0,3}")
        .prop_map(|(pre, body, post)| format!("{pre}{body}{post}"))
}

fn arb_history() -> impl Strategy<Value = Vec<crate::api::WireMessage>> {
    proptest::collection::vec(
        (any::<bool>(), "[a-z ]{1,20}").prop_map(|(user, content)| {
            let role = if user { "user" } else { "assistant" };
            (role, content)
        }),
        0..6,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (role, content))| {
                wire_message(i64::try_from(i).unwrap() + 1, role, &content, None)
            })
            .collect()
    })
}

async fn manager_with(
    remote: &Arc<MockRemote>,
    history: Vec<crate::api::WireMessage>,
) -> SessionManager<Arc<MockRemote>> {
    remote.queue_session(Ok(SessionDetail {
        id: 1,
        title: None,
        connection_id: Some(1),
        messages: history,
    }));
    SessionManager::open(remote.clone(), 1).await.unwrap()
}

proptest! {
    #[test]
    fn blank_text_never_changes_list_or_calls_remote(history in arb_history(), blank in arb_blank()) {
        block_on(async {
            let remote = Arc::new(MockRemote::new());
            let manager = manager_with(&remote, history.clone()).await;

            let result = manager.send_message(&blank).await;

            prop_assert!(matches!(result, Ok(None)));
            prop_assert_eq!(manager.messages().len(), history.len());
            prop_assert_eq!(remote.count_calls(|c| matches!(c, RecordedCall::PostMessage(..))), 0);
            Ok(())
        })?;
    }

    #[test]
    fn optimistic_message_visible_before_resolution(history in arb_history(), text in arb_text()) {
        block_on(async {
            let remote = Arc::new(MockRemote::yielding());
            let manager = manager_with(&remote, history.clone()).await;
            remote.queue_reply(Ok(wire_message(1000, "assistant", "done", None)));

            let observe = async { manager.snapshot() };
            let (_, seen) = tokio::join!(manager.send_message(&text), observe);

            prop_assert_eq!(seen.messages.len(), history.len() + 1);
            let last = seen.messages.last().unwrap();
            prop_assert!(last.is_provisional());
            prop_assert_eq!(last.role, Role::User);
            prop_assert_eq!(last.content.as_str(), text.trim());
            prop_assert!(seen.busy);
            Ok(())
        })?;
    }

    #[test]
    fn failed_send_never_shrinks(history in arb_history(), text in arb_text()) {
        block_on(async {
            let remote = Arc::new(MockRemote::new());
            let manager = manager_with(&remote, history.clone()).await;
            remote.queue_reply(Err(ApiError::transport("offline")));

            let result = manager.send_message(&text).await;

            prop_assert!(result.is_err());
            let messages = manager.messages();
            prop_assert_eq!(messages.len(), history.len() + 1);
            prop_assert!(messages.last().unwrap().is_provisional());
            prop_assert!(!manager.is_busy());
            Ok(())
        })?;
    }

    #[test]
    fn reconcile_preserves_existing_prefix(history in arb_history(), text in arb_text(), echo in any::<bool>()) {
        let mut messages: Vec<Message> = history.into_iter().map(Message::from).collect();
        let provisional = append_provisional(&mut messages, text.trim());
        let before = messages.clone();

        let reply = if echo {
            Message::from(wire_message(500, "user", text.trim(), None))
        } else {
            Message::from(wire_message(500, "assistant", "answer", Some("SELECT 1")))
        };
        let outcome = reconcile_reply(&mut messages, provisional, reply);

        prop_assert_eq!(&messages[..before.len()], &before[..]);
        match outcome {
            Reconciliation::EchoDeduplicated => prop_assert_eq!(messages.len(), before.len()),
            Reconciliation::Appended => prop_assert_eq!(messages.len(), before.len() + 1),
        }
        prop_assert_eq!(outcome == Reconciliation::EchoDeduplicated, echo);
    }
}
