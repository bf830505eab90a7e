//! SSE event types and definitions
//!
//! Contains the StreamEvent enum with the event variants the backend
//! streaming API emits on `/chat/stream`.

use serde::{Deserialize, Serialize};

/// Typed events from the backend streaming API.
///
/// The backend tags every `data:` payload with a `type` field. Events
/// of a type this client does not know deserialize to `Unknown` so a
/// newer backend does not break older clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Stream opened; metadata only, no content
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
    /// Incremental text fragment
    Content {
        #[serde(default)]
        content: String,
    },
    /// Stream completed; `full_response` is the server's authoritative
    /// aggregate of every fragment it sent
    End {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        full_response: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_used: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
    /// Backend reported an error mid-stream
    Error {
        #[serde(default)]
        error: String,
    },
    /// Any event type this client does not recognize
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Returns the event type name as a string for logging purposes.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::Content { .. } => "content",
            StreamEvent::End { .. } => "end",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Unknown => "unknown",
        }
    }

    /// True for the events that end a stream (`end` and `error`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::End { .. } | StreamEvent::Error { .. })
    }
}

/// Error produced when a `data:` payload fails to parse as an event
#[derive(Debug, Clone, PartialEq)]
pub struct SseParseError {
    /// The offending payload, truncated for logging
    pub payload: String,
    /// The underlying JSON error message
    pub message: String,
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid event payload {:?}: {}", self.payload, self.message)
    }
}

impl std::error::Error for SseParseError {}
