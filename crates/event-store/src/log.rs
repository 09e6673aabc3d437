use async_trait::async_trait;

use crate::{AggregateId, Event, EventDraft, EventKind, Result};

/// Storage contract for one domain's append-only event logs.
///
/// All implementations must be thread-safe (Send + Sync). Implementations
/// assign `event_id` and `created_at` on append and must return *total*
/// views from [`find_by_entity`](EventLog::find_by_entity): every previously
/// appended event for the aggregate, never a silently truncated page.
#[async_trait]
pub trait EventLog<T: EventKind>: Send + Sync {
    /// Appends a new event, assigning its identity and timestamp.
    ///
    /// Returns the materialized event as stored.
    async fn append(&self, draft: EventDraft<T>) -> Result<Event<T>>;

    /// Returns every event for the given aggregate, ascending by
    /// `created_at` with ties broken by `event_id`.
    ///
    /// An aggregate with no events yields an empty sequence; the caller
    /// decides whether that is an error.
    async fn find_by_entity(&self, entity_id: AggregateId) -> Result<Vec<Event<T>>>;
}
