//! Pipeline runner.
//!
//! Groups agents by their group tag, executes each pipeline stage in order
//! (single agent directly, multiple agents via round-robin chat), threads each
//! stage's output into the next stage's input, and persists the full session.

use conclave_core::{SessionRecord, TranscriptWriter};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::group_chat::{MaxMessageTermination, RoundRobinGroupChat};
use crate::{Agent, TranscriptMessage};

/// Default message cap for a multi-agent stage.
pub const DEFAULT_TERMINATION_COUNT: usize = 9;

/// The outcome of a full pipeline run.
#[derive(Debug)]
pub struct PipelineRun {
    /// Output of the last stage in the pipeline order.
    pub final_output: String,
    /// Task, per-stage outputs in pipeline order, and elapsed time.
    pub session: SessionRecord,
    /// Where the transcript was persisted, if the write succeeded.
    pub log_path: Option<PathBuf>,
}

/// Executes a configured pipeline over a roster of agents.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    termination_count: usize,
    writer: TranscriptWriter,
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRunner {
    /// Creates a runner with the default message cap and `logs` directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            termination_count: DEFAULT_TERMINATION_COUNT,
            writer: TranscriptWriter::new("logs"),
        }
    }

    /// Overrides the per-stage message cap.
    #[must_use]
    pub fn with_termination_count(mut self, termination_count: usize) -> Self {
        self.termination_count = termination_count;
        self
    }

    /// Overrides the transcript directory.
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.writer = TranscriptWriter::new(dir.into());
        self
    }

    /// Runs `task` through each group named in `pipeline_order`.
    ///
    /// Stages execute strictly sequentially; each stage's input is the prior
    /// stage's output. A stage with no matching agents is skipped with a
    /// warning and leaves the input unchanged. After the last stage the
    /// session is persisted; a failed write is logged but does not fail the
    /// run.
    ///
    /// # Errors
    /// Propagates the first agent failure; in that case nothing is persisted.
    pub async fn run(
        &self,
        task: &str,
        agents: &[Arc<dyn Agent>],
        pipeline_order: &[String],
    ) -> Result<PipelineRun> {
        let start = Instant::now();

        // Group agents by tag, preserving factory-creation order within each
        // group. That order is the round-robin speaking order.
        let mut grouped: IndexMap<&str, Vec<Arc<dyn Agent>>> = IndexMap::new();
        for agent in agents {
            grouped.entry(agent.group()).or_default().push(Arc::clone(agent));
        }

        let mut session = SessionRecord::new(task);
        let mut current_input = task.to_string();

        for group_name in pipeline_order {
            let Some(members) = grouped.get(group_name.as_str()) else {
                warn!(group = %group_name, "no agents in group, skipping stage");
                continue;
            };

            info!(group = %group_name, agents = members.len(), "running stage");

            let output = if let [agent] = members.as_slice() {
                let conversation = vec![TranscriptMessage::task(current_input.clone())];
                agent.respond(&conversation).await?
            } else {
                let chat = RoundRobinGroupChat::new(
                    format!("{group_name} group"),
                    members.clone(),
                    MaxMessageTermination::new(self.termination_count),
                );
                collect_transcript(&chat.run(&current_input).await?)
            };

            if output.is_empty() {
                warn!(group = %group_name, "stage produced an empty transcript");
            }

            session.record_stage(group_name.clone(), output.clone());
            current_input = output;
        }

        session.elapsed = start.elapsed();

        let log_path = match self.writer.write(&session) {
            Ok(path) => {
                info!(path = %path.display(), "full discussion log saved");
                Some(path)
            }
            Err(e) => {
                error!(error = %e, dir = %self.writer.dir().display(), "failed to save discussion log");
                None
            }
        };

        let final_output = pipeline_order
            .last()
            .and_then(|group| session.stage_output(group))
            .unwrap_or_default()
            .to_string();

        Ok(PipelineRun {
            final_output,
            session,
            log_path,
        })
    }
}

/// Renders emitted messages as a stage transcript: each message prefixed with
/// its speaker, separated by blank lines.
fn collect_transcript(messages: &[TranscriptMessage]) -> String {
    messages
        .iter()
        .map(|msg| format!("Source: {}\nContent: {}", msg.source, msg.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
