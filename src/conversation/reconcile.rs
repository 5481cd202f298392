//! Reconciling server-confirmed replies with optimistic entries
//!
//! Append-then-confirm: the optimistic user message stays where it was
//! appended, and the server reply goes after it. Nothing is ever replaced
//! by matching content, with one exception: a server echo of the user turn
//! sitting right behind its optimistic entry is dropped in favor of it.

use super::message::{Message, MessageId, Role};

/// How a reply was merged into the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Reply appended at the end
    Appended,
    /// Reply was the server's echo of the optimistic message; dropped
    EchoDeduplicated,
}

/// Append an optimistic user message and return its id
pub fn append_provisional(messages: &mut Vec<Message>, text: &str) -> MessageId {
    let message = Message::provisional(text);
    let id = message.id;
    messages.push(message);
    id
}

/// Merge a server reply for the send that appended `provisional`
pub fn reconcile_reply(
    messages: &mut Vec<Message>,
    provisional: MessageId,
    reply: Message,
) -> Reconciliation {
    if is_echo_of(messages.last(), provisional, &reply) {
        tracing::debug!(
            provisional = %provisional,
            server_id = %reply.id,
            "Dropping server echo of optimistic message"
        );
        return Reconciliation::EchoDeduplicated;
    }
    messages.push(reply);
    Reconciliation::Appended
}

/// Echo = same role and content, adjacent to the optimistic entry
fn is_echo_of(last: Option<&Message>, provisional: MessageId, reply: &Message) -> bool {
    last.is_some_and(|last| {
        last.id == provisional
            && reply.role == Role::User
            && last.role == reply.role
            && last.content == reply.content
    })
}
