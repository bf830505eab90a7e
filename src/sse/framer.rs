//! Extraction of typed events from decoded stream lines.

use tracing::warn;

use crate::sse::events::{SseParseError, StreamEvent};

/// Marker that identifies an event-carrying line.
const DATA_PREFIX: &str = "data:";

/// Longest payload slice echoed into logs for a malformed frame.
const LOG_PAYLOAD_LIMIT: usize = 120;

/// Parse the JSON payload of a `data:` line into a typed event.
pub fn parse_event(payload: &str) -> Result<StreamEvent, SseParseError> {
    serde_json::from_str(payload).map_err(|e| SseParseError {
        payload: truncate_for_log(payload),
        message: e.to_string(),
    })
}

fn truncate_for_log(payload: &str) -> String {
    if payload.len() <= LOG_PAYLOAD_LIMIT {
        return payload.to_string();
    }
    let mut end = LOG_PAYLOAD_LIMIT;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &payload[..end])
}

/// Extracts well-formed events from decoded lines.
///
/// Lines without the `data:` marker, and lines whose payload is empty
/// after stripping, are SSE framing noise (blank separators, comments)
/// and yield nothing. A payload that fails to parse is logged and
/// skipped; the stream keeps going.
#[derive(Debug, Default)]
pub struct EventFramer {
    malformed: u64,
}

impl EventFramer {
    /// Create a new framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line, returning the event it carries, if any.
    pub fn frame(&mut self, line: &str) -> Option<StreamEvent> {
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();
        if payload.is_empty() {
            return None;
        }

        match parse_event(payload) {
            Ok(event) => Some(event),
            Err(err) => {
                self.malformed += 1;
                warn!(total = self.malformed, "skipping malformed frame: {}", err);
                None
            }
        }
    }

    /// Number of malformed frames skipped so far.
    pub fn malformed_frames(&self) -> u64 {
        self.malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_content_line() {
        let mut framer = EventFramer::new();
        let event = framer.frame(r#"data: {"type":"content","content":"Hello"}"#);
        assert_eq!(
            event,
            Some(StreamEvent::Content {
                content: "Hello".to_string(),
            })
        );
    }

    #[test]
    fn test_frame_without_space_after_marker() {
        let mut framer = EventFramer::new();
        let event = framer.frame(r#"data:{"type":"end"}"#);
        assert_eq!(
            event,
            Some(StreamEvent::End {
                full_response: None,
                model_used: None,
                timestamp: None,
            })
        );
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut framer = EventFramer::new();
        assert_eq!(framer.frame(""), None);
        assert_eq!(framer.frame(": keep-alive"), None);
        assert_eq!(framer.frame("event: content"), None);
        assert_eq!(framer.frame("retry: 3000"), None);
        assert_eq!(framer.malformed_frames(), 0);
    }

    #[test]
    fn test_empty_payload_ignored() {
        let mut framer = EventFramer::new();
        assert_eq!(framer.frame("data:"), None);
        assert_eq!(framer.frame("data:   "), None);
        assert_eq!(framer.malformed_frames(), 0);
    }

    #[test]
    fn test_malformed_payload_skipped_and_counted() {
        let mut framer = EventFramer::new();
        assert_eq!(framer.frame("data: {not json"), None);
        assert_eq!(framer.malformed_frames(), 1);

        // The next valid frame still parses
        let event = framer.frame(r#"data: {"type":"content","content":"ok"}"#);
        assert_eq!(
            event,
            Some(StreamEvent::Content {
                content: "ok".to_string(),
            })
        );
        assert_eq!(framer.malformed_frames(), 1);
    }

    #[test]
    fn test_unrecognized_event_type_still_framed() {
        // Dropping unknown types is the dispatcher's job, not the framer's
        let mut framer = EventFramer::new();
        let event = framer.frame(r#"data: {"type":"ping"}"#);
        assert_eq!(event, Some(StreamEvent::Unknown));
    }

    #[test]
    fn test_parse_event_error_payload_truncated() {
        let long = format!("{{\"type\":\"content\",{}", "x".repeat(500));
        let err = parse_event(&long).unwrap_err();
        assert!(err.payload.len() <= LOG_PAYLOAD_LIMIT + 3);
        assert!(err.payload.ends_with("..."));
    }
}
