//! Agent orchestration for Conclave.
//!
//! This crate defines the `Agent` trait, the configuration-driven agent
//! factory, the bounded round-robin group chat, and the pipeline runner that
//! sequences stages and persists the session transcript.

pub mod agent;
pub mod error;
pub mod factory;
pub mod group_chat;
pub mod runner;

use async_trait::async_trait;
use conclave_models::ModelError;

pub use agent::AssistantAgent;
pub use error::PipelineError;
pub use factory::create_agents;
pub use group_chat::{MaxMessageTermination, RoundRobinGroupChat};
pub use runner::{PipelineRun, PipelineRunner, DEFAULT_TERMINATION_COUNT};

/// Speaker identity used for the operator's task message in a conversation.
pub const TASK_SOURCE: &str = "user";

/// One speaker-attributed message in a stage conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    /// Display name of the speaker (an agent name, or [`TASK_SOURCE`]).
    pub source: String,
    /// The message content.
    pub content: String,
}

impl TranscriptMessage {
    /// Convenience constructor.
    #[must_use]
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// Wraps the operator task as the opening message of a conversation.
    #[must_use]
    pub fn task(content: impl Into<String>) -> Self {
        Self::new(TASK_SOURCE, content)
    }
}

/// A named actor that produces one text response per invocation.
///
/// Implementations are `Send + Sync` so a group of agents can be shared with
/// the runner behind `Arc`s.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The agent's display name, used as its transcript speaker identity.
    fn name(&self) -> &str;

    /// The pipeline group tag this agent belongs to.
    fn group(&self) -> &str;

    /// Produces the agent's next message given the conversation so far.
    ///
    /// The conversation always opens with the task message and contains every
    /// message emitted during the current stage, in emission order.
    ///
    /// # Errors
    /// Returns a `ModelError` if the underlying model call fails.
    async fn respond(&self, conversation: &[TranscriptMessage]) -> Result<String, ModelError>;
}
