//! Model clients for Conclave.
//!
//! This crate defines the `Model` trait the orchestrator talks through, the
//! Ollama chat-completion client, a mock model for tests, and the readiness
//! probe run against the serving endpoint before any agent executes.

pub mod health;
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

pub use health::{HealthError, OllamaHealth};
pub use ollama::OllamaModel;

/// Represents an error that can occur when interacting with a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An error occurred during the API request (e.g., network issues).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The model endpoint returned an error response.
    #[error("Model Response Error: {0}")]
    ModelResponseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    SerializationError(String),
}

/// Represents a message in a conversation with a chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender ("user", "assistant", "system").
    pub role: String,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Parameters for controlling the model's generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    /// Sampling temperature, between 0 and 2.
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: None,
        }
    }
}

/// The response from a chat completion.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// The generated content.
    pub content: String,
    /// The ID of the model that produced the response.
    pub model_id: Option<String>,
}

/// A trait for interacting with chat models.
///
/// All models must be `Send + Sync` to allow sharing across tasks.
#[async_trait]
pub trait Model: Send + Sync {
    /// Generates a chat completion for the given conversation history.
    ///
    /// # Errors
    /// Returns a `ModelError` if generation fails.
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}

/// A mock implementation of the `Model` trait for testing.
///
/// By default it echoes a summary of the conversation; with
/// [`MockModel::with_responses`] it replays a scripted sequence instead,
/// which lets pipeline tests control exactly what each turn produces.
#[derive(Debug, Default)]
pub struct MockModel {
    id: String,
    scripted: Mutex<VecDeque<String>>,
}

impl MockModel {
    /// Creates a new `MockModel` with the given ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scripted: Mutex::new(VecDeque::new()),
        }
    }

    /// Creates a `MockModel` that replays `responses` in order, then falls
    /// back to the echo behavior once they are exhausted.
    #[must_use]
    pub fn with_responses(id: impl Into<String>, responses: Vec<String>) -> Self {
        Self {
            id: id.into(),
            scripted: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.id,
            message_count = messages.len(),
            parameters = ?parameters,
            "MockModel generating chat completion"
        );

        if let Ok(mut scripted) = self.scripted.lock() {
            if let Some(content) = scripted.pop_front() {
                return Ok(ModelResponse {
                    content,
                    model_id: Some(self.id.clone()),
                });
            }
        }

        let last = messages.last().map_or("", |m| m.content.as_str());
        Ok(ModelResponse {
            content: format!("Mock response from {} to: {last}", self.id),
            model_id: Some(self.id.clone()),
        })
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}
