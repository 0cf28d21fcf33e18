//! Typed council configuration.
//!
//! The YAML configuration is deserialized once at startup into these structs;
//! there is no runtime merging of untyped mappings. Agent order in the file is
//! preserved (via `IndexMap`), which is what the runner's round-robin turn
//! order is derived from.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Shared model-client settings applied to every agent.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmBasicSettings {
    /// Base URL of the Ollama-compatible serving endpoint.
    pub base_url: String,
    /// API key forwarded as a bearer token. Ollama ignores it, but
    /// OpenAI-compatible gateways in front of it may not.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Capability metadata for the configured models.
    #[serde(default)]
    pub model_info: ModelInfo,
}

/// Capability flags describing the configured model family.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub vision: bool,
    #[serde(default)]
    pub function_calling: bool,
    #[serde(default)]
    pub json_output: bool,
    #[serde(default)]
    pub family: Option<String>,
}

/// Per-agent model settings, merged with [`LlmBasicSettings`] by the factory.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Model name, e.g. `llama3.1:8b`.
    pub model: String,
    /// Sampling temperature; defaults to 0.7 when absent.
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// One configured agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Display name used as the transcript speaker identity.
    pub name: String,
    /// System prompt bound to the agent for the whole session.
    pub system_message: String,
    /// Pipeline group tag; agents sharing a tag execute together.
    pub group: String,
    /// Model settings for this agent.
    pub llm_config: LlmConfig,
}

/// The full council configuration: shared model settings, the agent roster,
/// and the pipeline stage order.
#[derive(Debug, Clone, Deserialize)]
pub struct CouncilConfig {
    pub llm_basic_settings: LlmBasicSettings,
    /// Agent key -> agent config, in file order.
    pub agents: IndexMap<String, AgentConfig>,
    /// Ordered group names defining stage execution order.
    pub pipeline: Vec<String>,
}

impl CouncilConfig {
    /// Loads and parses the configuration file at `path`.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if the YAML is malformed or missing required
    /// fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&contents)?;
        debug!(
            path = %path.display(),
            agents = config.agents.len(),
            stages = config.pipeline.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parses a configuration from a YAML string.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed YAML or missing fields.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Validates structural completeness, failing fast on the first violation.
    ///
    /// Checked in order: non-empty `agents`; per agent a non-empty `group`,
    /// `name`, `system_message`, and `llm_config.model`; non-empty `pipeline`;
    /// every pipeline name must match at least one agent's group tag.
    ///
    /// # Errors
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents.is_empty() {
            return Err(ConfigError::NoAgents);
        }

        for (key, agent) in &self.agents {
            let empty_field = |field| ConfigError::EmptyField {
                agent: key.clone(),
                field,
            };
            if agent.group.is_empty() {
                return Err(empty_field("group"));
            }
            if agent.name.is_empty() {
                return Err(empty_field("name"));
            }
            if agent.system_message.is_empty() {
                return Err(empty_field("system_message"));
            }
            if agent.llm_config.model.is_empty() {
                return Err(empty_field("llm_config.model"));
            }
        }

        if self.pipeline.is_empty() {
            return Err(ConfigError::EmptyPipeline);
        }

        for group in &self.pipeline {
            if !self.agents.values().any(|a| &a.group == group) {
                return Err(ConfigError::UnknownGroup(group.clone()));
            }
        }

        Ok(())
    }

    /// Returns the deduplicated list of model names referenced by any agent,
    /// in first-reference order. Used by the readiness probe.
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for agent in self.agents.values() {
            if !names.contains(&agent.llm_config.model) {
                names.push(agent.llm_config.model.clone());
            }
        }
        names
    }
}
