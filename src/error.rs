//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.
//!
//! Errors split into two tiers: artifact, download, and device failures are
//! fatal at build time (a pipeline that fails to build cannot serve requests,
//! and there is no retry or partial-availability mode), while
//! [`PipelineError::EmptyInput`] is the only per-request error and the caller
//! may fix the input and retry immediately.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
///
/// # Example
///
/// ```rust,no_run
/// use cine_sentiment::error::PipelineError;
///
/// fn handle_error(e: PipelineError) {
///     match &e {
///         PipelineError::Artifact(_) => {
///             // Bad artifact set - fix the files and rebuild
///         }
///         PipelineError::Download(_) => {
///             // Network issue - retry with backoff
///         }
///         PipelineError::EmptyInput => {
///             // Nothing to classify - ask for a review and retry
///         }
///         PipelineError::Device(_) => {
///             // GPU unavailable - fall back to CPU
///         }
///         PipelineError::Unexpected(_) => {
///             // Internal error - report bug
///             eprintln!("Internal error: {e}");
///         }
///         _ => {
///             // Future error variants
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Artifact file missing, unreadable, or incompatible. Fatal at build time.
    #[error("{0}")]
    Artifact(String),

    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// The review is empty after trimming whitespace. Provide text and retry.
    #[error("review is empty after trimming whitespace")]
    EmptyInput,

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Artifact(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Artifact(value.to_string())
    }
}
