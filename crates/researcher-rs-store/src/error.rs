//! Error types for the query store.

use thiserror::Error;

/// Errors returned by query store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No free identifier was found within the attempt cap.
    #[error("no free query id after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
    /// The backing database could not be reached or rejected the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A persisted row could not be decoded into a record.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// Record payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Identifier range is empty or includes zero.
    #[error("invalid id range {low}..={high}")]
    InvalidIdRange { low: u32, high: u32 },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
