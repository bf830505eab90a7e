//! banter - a terminal chat client for streaming LLM backends
//!
//! The crate is a small pipeline. Raw response bytes flow through
//! [`sse::LineDecoder`] into complete lines, through [`sse::EventFramer`]
//! into typed [`sse::StreamEvent`]s, through [`stream::dispatch`] into a
//! [`stream::StreamObserver`], and finally into the
//! [`conversation::Conversation`] that owns the message history.
//! [`client::ApiClient`] wires the front of that pipeline to the
//! backend's HTTP endpoints and [`session::ChatSession`] wires the back
//! of it to conversation state.

pub mod client;
pub mod config;
pub mod conversation;
pub mod models;
pub mod session;
pub mod sse;
pub mod stream;
