//! Conversation state owned by the chat session.
//!
//! The conversation is an ordered message list, append-only except for
//! the single in-flight assistant message a stream is writing into.
//! Every mutation goes through a method here; streaming callbacks key
//! their writes by message id so a stale stream cannot touch anything
//! but its own placeholder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Locally assigned id, strictly increasing within a session
    pub id: i64,
    /// Who authored the message
    pub role: Role,
    /// Message text; grows in place while an assistant reply streams
    pub content: String,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
    /// Model reported by the backend, assistant messages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

/// Ordered message history, insertion order = chronological order.
///
/// Ids keep increasing across `clear()`, so callbacks from a stream
/// started before a clear can never collide with a message created
/// afterwards.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    last_id: i64,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Append a user message, returning the stored copy.
    pub fn append_user_message(&mut self, text: &str) -> Message {
        let message = Message {
            id: self.next_id(),
            role: Role::User,
            content: text.to_string(),
            timestamp: Utc::now(),
            model_used: None,
        };
        self.messages.push(message.clone());
        message
    }

    /// Append an empty assistant placeholder for an incoming stream and
    /// return its id for correlating later stream callbacks.
    pub fn begin_assistant_message(&mut self, model_hint: Option<&str>) -> i64 {
        let id = self.next_id();
        self.messages.push(Message {
            id,
            role: Role::Assistant,
            content: String::new(),
            timestamp: Utc::now(),
            model_used: model_hint.map(str::to_string),
        });
        id
    }

    /// Concatenate a streamed fragment onto the message with this id.
    ///
    /// A missing id is a silent no-op. Under the stream's own
    /// invariants it cannot happen; it is reachable when a stale stream
    /// keeps writing after `clear()`, which only logs at debug level.
    pub fn append_content(&mut self, id: i64, fragment: &str) {
        match self.find_mut(id) {
            Some(message) => message.content.push_str(fragment),
            None => debug!(id, "append_content on a message that no longer exists"),
        }
    }

    /// Finalize a streamed message.
    ///
    /// When the server sent its aggregate of the full response, it
    /// replaces the locally accumulated fragments: fragments at the
    /// stream edges may have been reordered or lost, and the server is
    /// the source of truth for the complete text.
    pub fn finalize_message(&mut self, id: i64, full_text: Option<&str>, model_used: Option<&str>) {
        match self.find_mut(id) {
            Some(message) => {
                if let Some(text) = full_text {
                    message.content = text.to_string();
                }
                if let Some(model) = model_used {
                    message.model_used = Some(model.to_string());
                }
            }
            None => debug!(id, "finalize_message on a message that no longer exists"),
        }
    }

    /// Retract a message. Used to drop the placeholder when a stream
    /// fails so no empty or partial assistant message is left visible.
    pub fn remove_message(&mut self, id: i64) {
        self.messages.retain(|m| m.id != id);
    }

    /// Empty the conversation. Issued ids are never reused afterwards.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message by id.
    pub fn get(&self, id: i64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn find_mut(&mut self, id: i64) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}
