//! Wire types for the backend HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature bounds accepted by the backend.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;
/// Token limit bounds accepted by the backend.
pub const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 1..=4000;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Request body for `/chat` and `/chat/stream`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Model to use; the backend picks its default when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Set on requests to the streaming endpoint, omitted otherwise
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
}

impl ChatRequest {
    /// Create a request with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: None,
            temperature: None,
            max_tokens: None,
            stream: false,
        }
    }

    /// Set the model for this request (builder pattern)
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature for this request (builder pattern)
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the generation token limit for this request (builder pattern)
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Mark the request for the streaming endpoint (builder pattern)
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Check the request against the backend's parameter bounds before
    /// any network I/O, so an obviously bad request fails fast with the
    /// same wording the backend would use.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.message.trim().is_empty() {
            errors.push("Message must not be empty".to_string());
        }
        if let Some(temperature) = self.temperature {
            if !TEMPERATURE_RANGE.contains(&temperature) {
                errors.push("Temperature must be between 0.0 and 2.0".to_string());
            }
        }
        if let Some(max_tokens) = self.max_tokens {
            if !MAX_TOKENS_RANGE.contains(&max_tokens) {
                errors.push("Max tokens must be between 1 and 4000".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join(", "))
        }
    }
}

/// Response body from `/chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// Generated response text
    pub response: String,
    /// Model that produced the response
    pub model_used: String,
    /// Total tokens consumed
    pub tokens_used: u32,
    /// When the backend produced the response
    pub timestamp: DateTime<Utc>,
}

/// One entry of the `/models` listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Response body from `/models`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Response body from `/health`, display only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response body from `/status`, display only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub openai_connected: bool,
    #[serde(default)]
    pub database_connected: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
