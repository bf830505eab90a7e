//! Backend API client for chat completion.
//!
//! This module provides the HTTP client for the chat backend, including
//! streaming responses via Server-Sent Events (SSE).

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use reqwest::Client;
use tracing::debug;

use crate::models::{ChatRequest, ChatResponse, ModelsResponse, StatusResponse};
use crate::sse::{EventFramer, LineDecoder, StreamEvent};

/// Base URL the client targets when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// A pinned stream of typed events from the streaming endpoint.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ApiError>> + Send>>;

/// Error type for backend client operations
#[derive(Debug)]
pub enum ApiError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// JSON deserialization failed
    Json(serde_json::Error),
    /// Server returned an error status
    Server { status: u16, message: String },
    /// Backend reported an error through the stream
    Stream { message: String },
    /// Request rejected client-side before any network I/O
    InvalidRequest { message: String },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "HTTP error: {}", e),
            ApiError::Json(e) => write!(f, "JSON error: {}", e),
            ApiError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            ApiError::Stream { message } => write!(f, "Stream error: {}", message),
            ApiError::InvalidRequest { message } => write!(f, "Invalid request: {}", message),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Http(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Json(e)
    }
}

/// Client for the chat backend API.
///
/// Provides chat completion (one-shot and streaming), the model listing,
/// and the liveness endpoints.
pub struct ApiClient {
    /// Base URL of the backend API
    pub base_url: String,
    /// Reusable HTTP client
    client: Client,
}

impl ApiClient {
    /// Create a client pointed at the default base URL.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Request a one-shot chat completion via `POST /chat`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        request
            .validate()
            .map_err(|message| ApiError::InvalidRequest { message })?;

        let url = format!("{}/chat", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        Ok(response.json::<ChatResponse>().await?)
    }

    /// Open a streaming chat completion via `POST /chat/stream`.
    ///
    /// Returns a stream of typed events decoded from the SSE response
    /// body. Dropping the stream abandons the request; the connection
    /// is closed when the underlying response is dropped.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<EventStream, ApiError> {
        request
            .validate()
            .map_err(|message| ApiError::InvalidRequest { message })?;

        let mut body = request.clone();
        body.stream = true;

        let url = format!("{}/chat/stream", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let bytes_stream = response.bytes_stream();

        // Walk the byte stream through the line decoder and event
        // framer. One chunk can complete several events, so finished
        // events queue up and drain before the next chunk is read.
        let events = stream::unfold(
            (
                bytes_stream,
                LineDecoder::new(),
                EventFramer::new(),
                VecDeque::new(),
            ),
            |(mut bytes_stream, mut decoder, mut framer, mut ready)| async move {
                loop {
                    if let Some(event) = ready.pop_front() {
                        return Some((Ok(event), (bytes_stream, decoder, framer, ready)));
                    }

                    match bytes_stream.next().await {
                        Some(Ok(chunk)) => {
                            for line in decoder.feed(&chunk) {
                                if let Some(event) = framer.frame(&line) {
                                    ready.push_back(event);
                                }
                            }
                        }
                        Some(Err(e)) => {
                            return Some((
                                Err(ApiError::Http(e)),
                                (bytes_stream, decoder, framer, ready),
                            ));
                        }
                        None => {
                            let dropped = decoder.finish();
                            if dropped > 0 {
                                debug!(bytes = dropped, "discarding partial line at end of stream");
                            }
                            return None;
                        }
                    }
                }
            },
        );

        Ok(Box::pin(events))
    }

    /// Fetch the model listing via `GET /models`.
    pub async fn fetch_models(&self) -> Result<ModelsResponse, ApiError> {
        let url = format!("{}/models", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        Ok(response.json::<ModelsResponse>().await?)
    }

    /// Fetch backend status via `GET /status`. Display only.
    pub async fn status(&self) -> Result<StatusResponse, ApiError> {
        let url = format!("{}/status", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        Ok(response.json::<StatusResponse>().await?)
    }

    /// Check whether the backend is reachable and healthy.
    ///
    /// Returns `true` if `GET /health` answers with a success status.
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    async fn server_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ApiError::Server { status, message }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
