use thiserror::Error;

use crate::AggregateId;

/// Errors that can occur when interacting with an event log.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// No log exists for the referenced aggregate.
    #[error("No event log for aggregate: {0}")]
    LogNotFound(AggregateId),

    /// The log could not be reached; the caller may retry the whole
    /// replication attempt, which is safe because historical replay
    /// performs no side effects.
    #[error("Event log unavailable: {0}")]
    Unavailable(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
