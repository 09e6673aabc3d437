use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{AggregateId, Event, EventDraft, EventKind, EventLog, Result};

/// In-memory event log for tests and local runs.
///
/// Events are held in append order; reads sort by `created_at` with
/// `event_id` as the tie-break, matching the replay ordering contract.
#[derive(Clone)]
pub struct InMemoryEventLog<T: EventKind> {
    events: Arc<RwLock<Vec<Event<T>>>>,
    next_id: Arc<AtomicI64>,
}

impl<T: EventKind> Default for InMemoryEventLog<T> {
    fn default() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl<T: EventKind> InMemoryEventLog<T> {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored, across all aggregates.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns the event types appended for one aggregate, in replay order.
    ///
    /// Convenience for asserting on emitted outcome events in tests.
    pub async fn event_types_for(&self, entity_id: AggregateId) -> Vec<T> {
        self.find_by_entity(entity_id)
            .await
            .map(|events| events.into_iter().map(|e| e.event_type).collect())
            .unwrap_or_default()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl<T: EventKind> EventLog<T> for InMemoryEventLog<T> {
    async fn append(&self, draft: EventDraft<T>) -> Result<Event<T>> {
        let event_id = self.next_id.fetch_add(1, Ordering::SeqCst).into();
        let event = draft.into_event(event_id, Utc::now());

        tracing::debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            entity_id = %event.entity_id,
            "event appended"
        );

        let mut store = self.events.write().await;
        store.push(event.clone());
        Ok(event)
    }

    async fn find_by_entity(&self, entity_id: AggregateId) -> Result<Vec<Event<T>>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.event_id.cmp(&b.event_id))
        });
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum TestKind {
        Opened,
        Updated,
        Closed,
    }

    impl std::fmt::Display for TestKind {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl EventKind for TestKind {
        fn as_str(&self) -> &'static str {
            match self {
                TestKind::Opened => "OPENED",
                TestKind::Updated => "UPDATED",
                TestKind::Closed => "CLOSED",
            }
        }
    }

    #[tokio::test]
    async fn append_assigns_increasing_ids() {
        let log = InMemoryEventLog::new();
        let entity_id = AggregateId::new();

        let e1 = log
            .append(EventDraft::new(TestKind::Opened, entity_id))
            .await
            .unwrap();
        let e2 = log
            .append(EventDraft::new(TestKind::Updated, entity_id))
            .await
            .unwrap();

        assert!(e1.event_id < e2.event_id);
        assert_eq!(log.event_count().await, 2);
    }

    #[tokio::test]
    async fn find_by_entity_filters_and_orders() {
        let log = InMemoryEventLog::new();
        let a = AggregateId::new();
        let b = AggregateId::new();

        log.append(EventDraft::new(TestKind::Opened, a)).await.unwrap();
        log.append(EventDraft::new(TestKind::Opened, b)).await.unwrap();
        log.append(EventDraft::new(TestKind::Closed, a)).await.unwrap();

        let events = log.find_by_entity(a).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, TestKind::Opened);
        assert_eq!(events[1].event_type, TestKind::Closed);
    }

    #[tokio::test]
    async fn pinned_timestamps_control_replay_order() {
        let log = InMemoryEventLog::new();
        let entity_id = AggregateId::new();
        let base = Utc::now();

        // Appended out of order on purpose; createdAt decides.
        log.append(
            EventDraft::new(TestKind::Closed, entity_id).created_at(base + Duration::seconds(10)),
        )
        .await
        .unwrap();
        log.append(EventDraft::new(TestKind::Opened, entity_id).created_at(base))
            .await
            .unwrap();

        let events = log.find_by_entity(entity_id).await.unwrap();
        assert_eq!(events[0].event_type, TestKind::Opened);
        assert_eq!(events[1].event_type, TestKind::Closed);
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_event_id() {
        let log = InMemoryEventLog::new();
        let entity_id = AggregateId::new();
        let at = Utc::now();

        let e1 = log
            .append(EventDraft::new(TestKind::Opened, entity_id).created_at(at))
            .await
            .unwrap();
        let e2 = log
            .append(EventDraft::new(TestKind::Updated, entity_id).created_at(at))
            .await
            .unwrap();

        let events = log.find_by_entity(entity_id).await.unwrap();
        assert_eq!(events[0].event_id, e1.event_id);
        assert_eq!(events[1].event_id, e2.event_id);
    }

    #[tokio::test]
    async fn unknown_entity_yields_empty_log() {
        let log: InMemoryEventLog<TestKind> = InMemoryEventLog::new();
        let events = log.find_by_entity(AggregateId::new()).await.unwrap();
        assert!(events.is_empty());
    }
}
