//! Bounded round-robin group chat.
//!
//! Participants speak in fixed cyclic order, each seeing the full stage
//! conversation so far, until the termination condition is met.

use std::sync::Arc;
use tracing::debug;

use crate::{Agent, TranscriptMessage};
use conclave_models::ModelError;

/// Stops a group chat once the stage has emitted a maximum number of
/// messages. The opening task message does not count against the cap.
#[derive(Debug, Clone, Copy)]
pub struct MaxMessageTermination {
    max_messages: usize,
}

impl MaxMessageTermination {
    /// Creates a termination condition with the given message cap.
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self { max_messages }
    }

    /// Whether the chat should stop after `emitted` messages.
    #[must_use]
    pub fn is_met(&self, emitted: usize) -> bool {
        emitted >= self.max_messages
    }
}

/// A turn-taking chat over a fixed group of agents.
pub struct RoundRobinGroupChat {
    name: String,
    participants: Vec<Arc<dyn Agent>>,
    termination: MaxMessageTermination,
}

impl RoundRobinGroupChat {
    /// Creates a chat named `name` over `participants`, in speaking order.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        participants: Vec<Arc<dyn Agent>>,
        termination: MaxMessageTermination,
    ) -> Self {
        Self {
            name: name.into(),
            participants,
            termination,
        }
    }

    /// Runs the chat seeded with `task` and returns the messages emitted
    /// during it, in emission order. The task itself is not part of the
    /// returned transcript.
    ///
    /// # Errors
    /// Propagates the first `ModelError` from any participant; no retries.
    pub async fn run(&self, task: &str) -> Result<Vec<TranscriptMessage>, ModelError> {
        if self.participants.is_empty() {
            return Ok(Vec::new());
        }

        let mut conversation = vec![TranscriptMessage::task(task)];
        let mut emitted: Vec<TranscriptMessage> = Vec::new();

        'chat: loop {
            for agent in &self.participants {
                if self.termination.is_met(emitted.len()) {
                    debug!(
                        chat = %self.name,
                        messages = emitted.len(),
                        "termination condition met"
                    );
                    break 'chat;
                }

                let content = agent.respond(&conversation).await?;
                debug!(
                    chat = %self.name,
                    speaker = %agent.name(),
                    turn = emitted.len() + 1,
                    "message emitted"
                );
                let message = TranscriptMessage::new(agent.name(), content);
                conversation.push(message.clone());
                emitted.push(message);
            }
        }

        Ok(emitted)
    }
}
