//! SSE (Server-Sent Events) stream handling
//!
//! Turns the raw byte stream of a `/chat/stream` response into typed
//! events. The backend frames events as:
//! - `data: <json>` - an event payload tagged with a `type` field
//! - Empty line - separator between events
//! - Anything else - framing noise, ignored
//!
//! # Module structure
//! - `decoder` - byte chunks to complete lines (LineDecoder)
//! - `events` - event type definitions (StreamEvent, SseParseError)
//! - `framer` - lines to parsed events (EventFramer, parse_event)

mod decoder;
mod events;
mod framer;

pub use decoder::LineDecoder;
pub use events::{SseParseError, StreamEvent};
pub use framer::{parse_event, EventFramer};
