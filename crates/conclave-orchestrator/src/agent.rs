//! Assistant agent implementation.
//!
//! An `AssistantAgent` binds a display name, a pipeline group, a system
//! message, and a model client; each `respond` call maps the stage
//! conversation into chat messages under that system message.

use async_trait::async_trait;
use conclave_models::{ChatMessage, Model, ModelError, ModelParameters};
use std::sync::Arc;
use tracing::{debug, error};

use crate::{Agent, TranscriptMessage, TASK_SOURCE};

/// A system-message-bound conversational agent.
pub struct AssistantAgent {
    /// Display name, used as the transcript speaker identity.
    name: String,
    /// Pipeline group tag.
    group: String,
    /// System prompt bound for the process lifetime.
    system_message: String,
    /// Model client used for every response.
    model: Arc<dyn Model>,
    /// Generation parameters merged from the configuration.
    parameters: ModelParameters,
}

impl AssistantAgent {
    /// Creates a new `AssistantAgent`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        system_message: impl Into<String>,
        model: Arc<dyn Model>,
        parameters: ModelParameters,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            system_message: system_message.into(),
            model,
            parameters,
        }
    }

    /// Maps the stage conversation to chat messages from this agent's point
    /// of view: its own prior messages become `assistant` turns, the task and
    /// other speakers become `user` turns. Other agents' messages keep their
    /// speaker name as a prefix so the model can attribute them.
    fn build_messages(&self, conversation: &[TranscriptMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ChatMessage::new("system", self.system_message.clone()));
        for msg in conversation {
            if msg.source == self.name {
                messages.push(ChatMessage::new("assistant", msg.content.clone()));
            } else if msg.source == TASK_SOURCE {
                messages.push(ChatMessage::new("user", msg.content.clone()));
            } else {
                messages.push(ChatMessage::new(
                    "user",
                    format!("{}: {}", msg.source, msg.content),
                ));
            }
        }
        messages
    }
}

impl std::fmt::Debug for AssistantAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantAgent")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("model_id", &self.model.model_id())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> &str {
        &self.group
    }

    async fn respond(&self, conversation: &[TranscriptMessage]) -> Result<String, ModelError> {
        debug!(
            agent = %self.name,
            group = %self.group,
            conversation_len = conversation.len(),
            "agent responding"
        );

        let messages = self.build_messages(conversation);
        let response = self
            .model
            .generate_chat_completion(&messages, Some(self.parameters.clone()))
            .await
            .map_err(|e| {
                error!(agent = %self.name, error = %e, "model generation failed");
                e
            })?;

        debug!(
            agent = %self.name,
            response_len = response.content.len(),
            "agent responded"
        );
        Ok(response.content)
    }
}
