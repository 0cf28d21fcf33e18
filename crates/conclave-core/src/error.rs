//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the council configuration.
///
/// All of these are fatal at startup: the CLI's top-level handler logs the
/// error and exits non-zero rather than running a pipeline against a
/// configuration that would make the results meaningless.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML or is missing required fields.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The `agents` section is empty.
    #[error("'agents' must be a non-empty mapping")]
    NoAgents,

    /// A required per-agent field is present but empty.
    #[error("agent '{agent}' has an empty '{field}' field")]
    EmptyField {
        /// Agent key in the configuration.
        agent: String,
        /// Name of the offending field.
        field: &'static str,
    },

    /// The `pipeline` section is empty.
    #[error("'pipeline' must be a non-empty list of group names")]
    EmptyPipeline,

    /// The pipeline references a group no agent belongs to.
    #[error("pipeline references group '{0}' which does not exist in agents")]
    UnknownGroup(String),
}
