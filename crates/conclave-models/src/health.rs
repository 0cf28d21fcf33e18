//! Readiness probe for the Ollama serving endpoint.
//!
//! Before any agent executes, the endpoint must be reachable and every model
//! referenced by the configuration must be present. If the endpoint is down,
//! the probe attempts to launch `ollama serve` and polls until it answers.

use reqwest::Client;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Errors raised by the readiness probe. All fatal at startup.
#[derive(Debug, Error)]
pub enum HealthError {
    /// `ollama serve` could not be launched.
    #[error("failed to launch 'ollama serve': {0}")]
    Spawn(#[from] std::io::Error),

    /// The serving endpoint never became reachable.
    #[error("model service unreachable at {0} after repeated attempts")]
    ServiceUnavailable(String),

    /// One or more configured models are not installed.
    #[error("missing models: {}", .0.join(", "))]
    MissingModels(Vec<String>),
}

/// Probes and, if necessary, starts the Ollama serving endpoint.
#[derive(Debug, Clone)]
pub struct OllamaHealth {
    base_url: String,
    client: Client,
}

impl OllamaHealth {
    /// Seconds between reachability polls after launching the service.
    const POLL_INTERVAL: Duration = Duration::from_secs(1);
    /// Number of reachability polls before giving up.
    const START_ATTEMPTS: u32 = 15;

    /// Creates a probe against `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Checks whether the serving endpoint answers on `/v1/models`.
    ///
    /// Any non-200 response or connection failure counts as not running.
    pub async fn is_running(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(status = %resp.status(), "unexpected status from model service");
                false
            }
            Err(e) => {
                debug!(error = %e, "model service not reachable");
                false
            }
        }
    }

    /// Checks whether `model` is installed, via `/v1/models/{model}`.
    pub async fn model_available(&self, model: &str) -> bool {
        let url = format!("{}/v1/models/{}", self.base_url, model);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!(model = %model, error = %e, "unable to check model availability");
                false
            }
        }
    }

    /// Launches `ollama serve` as a detached child and polls the endpoint
    /// once per second until it answers.
    ///
    /// # Errors
    /// Returns `HealthError::Spawn` if the binary cannot be launched and
    /// `HealthError::ServiceUnavailable` if the endpoint never comes up.
    pub async fn start_service(&self) -> Result<(), HealthError> {
        info!("starting model service with 'ollama serve'");
        Command::new("ollama")
            .arg("serve")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        for attempt in 1..=Self::START_ATTEMPTS {
            debug!(attempt, max_attempts = Self::START_ATTEMPTS, "waiting for model service");
            tokio::time::sleep(Self::POLL_INTERVAL).await;
            if self.is_running().await {
                info!("model service is now running");
                return Ok(());
            }
        }
        Err(HealthError::ServiceUnavailable(self.base_url.clone()))
    }

    /// Ensures the endpoint is reachable (starting it if needed) and that
    /// every name in `models` is installed.
    ///
    /// # Errors
    /// Returns the first `HealthError` encountered; any failure here is a
    /// fatal startup condition.
    pub async fn ensure_ready(&self, models: &[String]) -> Result<(), HealthError> {
        if self.is_running().await {
            debug!(base_url = %self.base_url, "model service is running");
        } else {
            self.start_service().await?;
        }

        let mut missing = Vec::new();
        for model in models {
            if !self.model_available(model).await {
                missing.push(model.clone());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(HealthError::MissingModels(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_is_running_on_200() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let health = OllamaHealth::new(server.url());
        assert!(health.is_running().await);
    }

    #[tokio::test]
    async fn test_is_running_false_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/v1/models").with_status(500).create_async().await;

        let health = OllamaHealth::new(server.url());
        assert!(!health.is_running().await);
    }

    #[tokio::test]
    async fn test_is_running_false_when_unreachable() {
        // Nothing listens on this port.
        let health = OllamaHealth::new("http://127.0.0.1:1");
        assert!(!health.is_running().await);
    }

    #[tokio::test]
    async fn test_model_available() {
        let mut server = mockito::Server::new_async().await;
        let _present = server
            .mock("GET", "/v1/models/llama3.1:8b")
            .with_status(200)
            .create_async()
            .await;
        let _absent = server
            .mock("GET", "/v1/models/missing:7b")
            .with_status(404)
            .create_async()
            .await;

        let health = OllamaHealth::new(server.url());
        assert!(health.model_available("llama3.1:8b").await);
        assert!(!health.model_available("missing:7b").await);
    }

    #[tokio::test]
    async fn test_ensure_ready_reports_missing_models() {
        let mut server = mockito::Server::new_async().await;
        let _models = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .create_async()
            .await;
        let _present = server
            .mock("GET", "/v1/models/llama3.1:8b")
            .with_status(200)
            .create_async()
            .await;
        let _absent = server
            .mock("GET", "/v1/models/missing:7b")
            .with_status(404)
            .create_async()
            .await;

        let health = OllamaHealth::new(server.url());
        let err = health
            .ensure_ready(&["llama3.1:8b".to_string(), "missing:7b".to_string()])
            .await
            .unwrap_err();

        match err {
            HealthError::MissingModels(missing) => assert_eq!(missing, vec!["missing:7b"]),
            other => panic!("expected MissingModels, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ensure_ready_ok_when_all_present() {
        let mut server = mockito::Server::new_async().await;
        let _models = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .create_async()
            .await;
        let _present = server
            .mock("GET", "/v1/models/llama3.1:8b")
            .with_status(200)
            .create_async()
            .await;

        let health = OllamaHealth::new(server.url());
        assert!(health.ensure_ready(&["llama3.1:8b".to_string()]).await.is_ok());
    }
}
