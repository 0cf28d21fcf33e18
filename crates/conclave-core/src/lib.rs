//! Core types for Conclave.
//!
//! This crate owns the typed council configuration (loading and validation)
//! and the session record / transcript writer used to persist a pipeline run.

pub mod config;
pub mod error;
pub mod session;

pub use config::{AgentConfig, CouncilConfig, LlmBasicSettings, LlmConfig, ModelInfo};
pub use error::ConfigError;
pub use session::{SessionRecord, TranscriptWriter};
