//! Error types for the simulation core.
//!
//! The spread model itself never fails mid-run. Errors only arise when a run
//! is set up with an impossible configuration, rejected up front for a
//! non-positive duration, or aborted through its cancellation flag.
//!
//! The advisor boundaries have their own error types. Callers normally turn
//! those into fallback values instead of propagating them.

use thiserror::Error;

/// Errors surfaced by simulation setup and the runner.
#[derive(Debug, Error)]
pub enum SimError {
    /// Duration must be a positive number of hours.
    #[error("duration must be a positive number of hours, got {0}")]
    InvalidDuration(i64),

    /// A configuration value cannot produce a valid run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The caller raised the cancellation flag before the run finished.
    #[error("simulation cancelled after {completed_steps} of {total_steps} steps")]
    Cancelled {
        /// Steps applied before the flag was observed
        completed_steps: usize,
        /// Steps the full run would have applied
        total_steps: usize,
    },

    /// Parameter or configuration JSON could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shorthand result type for the simulation core.
pub type SimResult<T> = Result<T, SimError>;

/// Failure to turn a free-text request into parameters.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Nothing to extract from.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// The extraction reply was not the expected JSON object.
    #[error("malformed extraction reply: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The extractor answered with an explicit error.
    #[error("extractor reported an error: {0}")]
    Rejected(String),

    /// The extraction backend could not be reached.
    #[error("extractor unavailable: {0}")]
    Unavailable(String),
}

/// Failure to answer a question about impact data.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Nothing to answer.
    #[error("question is empty")]
    EmptyQuestion,

    /// The analysis reply was not the expected JSON object.
    #[error("malformed analysis reply: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The analysis backend could not be reached.
    #[error("analyst unavailable: {0}")]
    Unavailable(String),
}
