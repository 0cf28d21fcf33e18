//! Configuration-driven agent factory.
//!
//! Merges the shared model settings with each agent's `llm_config` and
//! instantiates one [`AssistantAgent`] per configured agent, in file order.
//! The runner's round-robin turn order is derived from that creation order.

use conclave_core::CouncilConfig;
use conclave_models::{ModelParameters, OllamaModel};
use std::sync::Arc;
use tracing::debug;

use crate::{Agent, AssistantAgent};

/// Default sampling temperature when an agent's `llm_config` omits one.
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Builds the agent roster from a validated configuration.
#[must_use]
pub fn create_agents(config: &CouncilConfig) -> Vec<Arc<dyn Agent>> {
    let basic = &config.llm_basic_settings;
    let mut agents: Vec<Arc<dyn Agent>> = Vec::with_capacity(config.agents.len());

    for (key, agent_cfg) in &config.agents {
        let mut model =
            OllamaModel::new(agent_cfg.llm_config.model.clone(), basic.base_url.clone());
        if let Some(api_key) = &basic.api_key {
            model = model.with_api_key(api_key.clone());
        }

        let parameters = ModelParameters {
            temperature: Some(agent_cfg.llm_config.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_tokens: None,
        };

        debug!(
            key = %key,
            name = %agent_cfg.name,
            group = %agent_cfg.group,
            model = %agent_cfg.llm_config.model,
            "agent created"
        );
        agents.push(Arc::new(AssistantAgent::new(
            agent_cfg.name.clone(),
            agent_cfg.group.clone(),
            agent_cfg.system_message.clone(),
            Arc::new(model),
            parameters,
        )));
    }

    agents
}
