//! Chat session: ties the backend client to conversation state.
//!
//! A session owns one [`Conversation`] and one [`ApiClient`] plus the
//! default request parameters. Submitting a prompt appends the user
//! message, then either waits for the one-shot response or drives the
//! event stream into the conversation through a [`StreamObserver`].

use crate::client::{ApiClient, ApiError};
use crate::config::Config;
use crate::conversation::{Conversation, Message};
use crate::models::ChatRequest;
use crate::stream::{consume, StreamObserver, StreamOutcome};

/// Applies stream events to the conversation.
///
/// The placeholder id is captured at construction; every write is keyed
/// by it, so this observer can only ever touch its own message.
struct Recorder<'a, F: FnMut(&str)> {
    conversation: &'a mut Conversation,
    message_id: i64,
    on_delta: F,
}

impl<F: FnMut(&str)> StreamObserver for Recorder<'_, F> {
    fn on_content(&mut self, fragment: &str) {
        self.conversation.append_content(self.message_id, fragment);
        (self.on_delta)(fragment);
    }

    fn on_end(&mut self, full_response: Option<&str>, model_used: Option<&str>) {
        self.conversation
            .finalize_message(self.message_id, full_response, model_used);
    }

    fn on_error(&mut self, _message: &str) {
        self.conversation.remove_message(self.message_id);
    }
}

/// An interactive chat session against one backend.
pub struct ChatSession {
    client: ApiClient,
    conversation: Conversation,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl ChatSession {
    /// Create a session from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_client(ApiClient::with_base_url(config.base_url.clone()), config)
    }

    /// Create a session with a pre-built client, for tests and custom
    /// client setups.
    pub fn with_client(client: ApiClient, config: &Config) -> Self {
        Self {
            client,
            conversation: Conversation::new(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Submit a prompt and wait for the complete response.
    ///
    /// The user message is always appended; the assistant message is
    /// appended only once the backend has answered.
    pub async fn send(&mut self, text: &str) -> Result<Message, ApiError> {
        self.conversation.append_user_message(text);

        let response = self.client.chat(&self.request_for(text)).await?;

        let id = self.conversation.begin_assistant_message(None);
        self.conversation
            .finalize_message(id, Some(&response.response), Some(&response.model_used));
        self.message_by_id(id)
    }

    /// Submit a prompt and stream the response into the conversation.
    ///
    /// `on_delta` is called with each fragment as it arrives, for
    /// incremental display. On any failure - a backend `error` event, a
    /// transport error, or the connection closing early - the
    /// placeholder is retracted and exactly one error is returned.
    pub async fn send_streaming<F>(&mut self, text: &str, on_delta: F) -> Result<Message, ApiError>
    where
        F: FnMut(&str),
    {
        self.conversation.append_user_message(text);

        let request = self.request_for(text);
        let message_id = self
            .conversation
            .begin_assistant_message(request.model.as_deref());

        let events = match self.client.chat_stream(&request).await {
            Ok(events) => events,
            Err(err) => {
                self.conversation.remove_message(message_id);
                return Err(err);
            }
        };

        let mut recorder = Recorder {
            conversation: &mut self.conversation,
            message_id,
            on_delta,
        };

        match consume(events, &mut recorder).await {
            StreamOutcome::Completed => self.message_by_id(message_id),
            StreamOutcome::Failed { message } => Err(ApiError::Stream { message }),
        }
    }

    /// Drop the conversation history. Ids stay monotonic, so a stream
    /// still draining from before the clear cannot write into messages
    /// created afterwards.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Switch the model used for subsequent requests.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// The model used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The conversation history.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The underlying API client, for the auxiliary endpoints.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn request_for(&self, text: &str) -> ChatRequest {
        ChatRequest::new(text)
            .with_model(self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    fn message_by_id(&self, id: i64) -> Result<Message, ApiError> {
        self.conversation.get(id).cloned().ok_or(ApiError::Stream {
            message: "response message missing after completion".to_string(),
        })
    }
}
