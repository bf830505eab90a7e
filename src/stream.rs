//! Event dispatch and stream consumption.
//!
//! Sits between the typed event stream produced by the client and the
//! conversation state: routes each event to at most one observer slot
//! and tracks the stream's terminal state.

use futures_util::{pin_mut, Stream, StreamExt};
use tracing::debug;

use crate::client::ApiError;
use crate::sse::StreamEvent;

/// Callback slots for stream events.
///
/// Every method defaults to a no-op, so an observer implements only the
/// slots it cares about. Exactly one slot fires per recognized event.
pub trait StreamObserver {
    /// The backend opened the stream; metadata only.
    fn on_start(&mut self, _model: Option<&str>) {}
    /// An incremental text fragment arrived.
    fn on_content(&mut self, _fragment: &str) {}
    /// The stream completed. `full_response`, when present, is the
    /// server's authoritative aggregate of all fragments.
    fn on_end(&mut self, _full_response: Option<&str>, _model_used: Option<&str>) {}
    /// The stream failed, either a backend `error` event or a transport
    /// failure. Fires at most once per stream.
    fn on_error(&mut self, _message: &str) {}
}

/// Phase of a stream as observed through its dispatched events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// More events may follow
    Streaming,
    /// Terminal: an `end` event fired
    Completed,
    /// Terminal: an `error` event or transport failure fired
    Failed,
}

impl StreamPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamPhase::Completed | StreamPhase::Failed)
    }
}

/// Route one event to its observer slot, returning the resulting phase.
///
/// Events of unrecognized type fall through without any slot firing.
pub fn dispatch(event: &StreamEvent, observer: &mut dyn StreamObserver) -> StreamPhase {
    match event {
        StreamEvent::Start { model, .. } => {
            observer.on_start(model.as_deref());
            StreamPhase::Streaming
        }
        StreamEvent::Content { content } => {
            observer.on_content(content);
            StreamPhase::Streaming
        }
        StreamEvent::End {
            full_response,
            model_used,
            ..
        } => {
            observer.on_end(full_response.as_deref(), model_used.as_deref());
            StreamPhase::Completed
        }
        StreamEvent::Error { error } => {
            observer.on_error(error);
            StreamPhase::Failed
        }
        StreamEvent::Unknown => {
            debug!("dropping event of unrecognized type");
            StreamPhase::Streaming
        }
    }
}

/// Terminal result of consuming a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Failed { message: String },
}

/// Drive an event stream to a terminal state.
///
/// Dispatch is synchronous with respect to frame consumption: the next
/// item is not polled until the current event's slot has returned.
/// Reading stops at the first terminal event, so at most one terminal
/// notification fires even if the server keeps sending. A transport
/// failure, or the connection closing before a terminal event, surfaces
/// exactly once through `on_error`.
pub async fn consume<S>(events: S, observer: &mut dyn StreamObserver) -> StreamOutcome
where
    S: Stream<Item = Result<StreamEvent, ApiError>>,
{
    pin_mut!(events);

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => match dispatch(&event, observer) {
                StreamPhase::Streaming => {}
                StreamPhase::Completed => return StreamOutcome::Completed,
                StreamPhase::Failed => {
                    let message = match event {
                        StreamEvent::Error { error } => error,
                        _ => "stream failed".to_string(),
                    };
                    return StreamOutcome::Failed { message };
                }
            },
            Err(err) => {
                let message = err.to_string();
                observer.on_error(&message);
                return StreamOutcome::Failed { message };
            }
        }
    }

    // The connection closed without a terminal event. Treat it like a
    // transport failure so the caller retracts the placeholder instead
    // of keeping a silently truncated response.
    let message = "connection closed before the response completed".to_string();
    observer.on_error(&message);
    StreamOutcome::Failed { message }
}
