//! Error types for pipeline execution.

use conclave_models::ModelError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pipeline run.
///
/// Agent calls are not retried: the first model failure propagates to the
/// caller and no partial transcript is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An agent's model call failed.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
