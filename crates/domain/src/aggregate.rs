//! The aggregate-root contract shared by all six domains.

use std::fmt;
use std::hash::Hash;

use common::AggregateId;
use event_store::EventKind;
use serde::{Serialize, de::DeserializeOwned};

/// Trait implemented by every event-sourced aggregate on the platform.
///
/// An aggregate's `status` field is a cache: the authoritative value is
/// computed by replaying the aggregate's event log through its domain's
/// state machine. The replication engine folds the status along the replay
/// and workflow actions write the refreshed cache back through the entity
/// service.
pub trait AggregateRoot:
    Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// The domain's closed set of statuses; doubles as the state set of
    /// the domain's machine definition.
    type Status: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// The domain's closed set of event types.
    type EventType: EventKind;

    /// Returns the aggregate type name, used for routing and logging.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's identity.
    fn id(&self) -> AggregateId;

    /// Returns the cached status.
    fn status(&self) -> Self::Status;

    /// Replaces the cached status. Called by the replication engine while
    /// folding the log and by workflow actions when compensating.
    fn set_status(&mut self, status: Self::Status);
}
