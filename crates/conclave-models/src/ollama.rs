//! Ollama chat-completion client.
//!
//! Implements the `Model` trait against Ollama's native `/api/chat` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{ChatMessage, Model, ModelError, ModelParameters, ModelResponse};

/// Ollama model client.
#[derive(Debug, Clone)]
pub struct OllamaModel {
    /// The model ID (e.g., "llama3.1:8b", "mistral:7b").
    model_id: String,
    /// Base URL of the Ollama API (e.g., "http://localhost:11434").
    base_url: String,
    /// Optional bearer token, for OpenAI-compatible gateways in front of
    /// Ollama. Ollama itself ignores it.
    api_key: Option<String>,
    /// HTTP client for making requests.
    client: Client,
}

impl OllamaModel {
    /// Creates a new `OllamaModel` against `base_url`.
    #[must_use]
    pub fn new(model_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            base_url: base_url.into(),
            api_key: None,
            client: Client::new(),
        }
    }

    /// Attaches an API key sent as a bearer token with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The base URL this client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<RequestMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<RequestOptions>,
}

#[derive(Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct RequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>, // max_tokens equivalent
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

impl OllamaModel {
    fn build_options(parameters: Option<ModelParameters>) -> Option<RequestOptions> {
        parameters.map(|p| RequestOptions {
            temperature: p.temperature,
            num_predict: p.max_tokens,
        })
    }
}

#[async_trait]
impl Model for OllamaModel {
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            parameters = ?parameters,
            "OllamaModel generating chat completion"
        );

        let url = format!("{}/api/chat", self.base_url);

        let request_body = ChatRequest {
            model: self.model_id.clone(),
            messages: messages
                .iter()
                .map(|m| RequestMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
            options: Self::build_options(parameters),
        };

        let mut request = self.client.post(&url).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, base_url = %self.base_url, "failed to connect to Ollama");
            if e.is_connect() {
                ModelError::RequestError(format!(
                    "Ollama server not reachable at {}. Start it with 'ollama serve'.",
                    self.base_url
                ))
            } else {
                ModelError::RequestError(format!("Network error: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                "Ollama API returned error status"
            );

            let not_found = status == 404
                || serde_json::from_str::<ApiError>(&error_text)
                    .is_ok_and(|e| e.error.contains("not found"));
            if not_found {
                return Err(ModelError::ModelResponseError(format!(
                    "Model '{}' not found. Pull it with 'ollama pull {}'.",
                    self.model_id, self.model_id
                )));
            }

            return Err(ModelError::ModelResponseError(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "failed to parse Ollama API response");
            ModelError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        Ok(ModelResponse {
            content: chat_response.message.content,
            model_id: Some(self.model_id.clone()),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
