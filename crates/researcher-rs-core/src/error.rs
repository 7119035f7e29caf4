//! Error types for routing and orchestration.

use researcher_rs_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by orchestrator operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input rejected before any work was done.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Query store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from a single language-model call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model timed out after {0:?}")]
    Timeout(Duration),
    #[error("language model request failed: {0}")]
    Provider(String),
    #[error("language model returned an empty reply")]
    EmptyReply,
}
