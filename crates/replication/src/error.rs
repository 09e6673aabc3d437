//! Replication error taxonomy.

use common::AggregateId;
use event_store::EventStoreError;
use thiserror::Error;

use crate::entity::ServiceError;
use crate::remote::RemoteError;

/// Errors surfaced by a replication attempt.
///
/// Callers (the event transport layer) receive either a resulting aggregate
/// snapshot or one of these; they decide whether to redeliver. None of these
/// variants is retried automatically by the engine itself.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The aggregate referenced by the event could not be located. Fatal to
    /// this replication.
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(AggregateId),

    /// The triggering event has no transition defined from the state the
    /// replay arrived at. Historical events in the same situation are
    /// skipped instead.
    #[error("No transition from status '{status}' on triggering event '{event_type}'")]
    NoApplicableTransition { status: String, event_type: String },

    /// A workflow action's business-rule check failed. The command is
    /// rejected with no state change.
    #[error("Precondition violated in '{action}': {reason}")]
    PreconditionViolation {
        action: &'static str,
        reason: String,
    },

    /// A downstream call failed. The saga compensator already ran before
    /// this surfaced.
    #[error("Remote step failed in '{action}': {source}")]
    RemoteStepFailure {
        action: &'static str,
        #[source]
        source: RemoteError,
    },

    /// The entity service could not complete a read or write.
    #[error("Entity service error: {0}")]
    Entity(#[from] ServiceError),

    /// The event log could not complete an append or fetch.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),
}

/// Result type for replication operations.
pub type Result<T> = std::result::Result<T, ReplicationError>;
