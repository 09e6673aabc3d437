//! Event transport adapter.
//!
//! Collaborators append events and publish them; the dispatcher delivers
//! each one to the replication engine. Delivery is at-least-once from the
//! transport's point of view: a failed replication is logged and left to
//! the publisher to redeliver, which the replay design tolerates because
//! only the triggering action performs side effects.

use std::sync::Arc;

use domain::AggregateRoot;
use event_store::{Event, EventKind};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::engine::ReplicationEngine;

/// The transport's consuming side has shut down.
#[derive(Debug, Error)]
#[error("Event transport closed")]
pub struct TransportClosed;

/// Sending half of the event transport.
#[derive(Clone)]
pub struct EventPublisher<T: EventKind> {
    tx: mpsc::Sender<Event<T>>,
}

impl<T: EventKind> EventPublisher<T> {
    /// Hands a newly-appended event to the dispatcher.
    pub async fn publish(&self, event: Event<T>) -> Result<(), TransportClosed> {
        self.tx.send(event).await.map_err(|_| TransportClosed)
    }
}

/// Receiving half of the event transport: drives the replication engine.
pub struct EventDispatcher<A: AggregateRoot> {
    engine: Arc<ReplicationEngine<A>>,
    rx: mpsc::Receiver<Event<A::EventType>>,
}

/// Creates a connected publisher/dispatcher pair for one domain.
pub fn channel<A: AggregateRoot>(
    engine: Arc<ReplicationEngine<A>>,
    capacity: usize,
) -> (EventPublisher<A::EventType>, EventDispatcher<A>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventPublisher { tx }, EventDispatcher { engine, rx })
}

impl<A: AggregateRoot> EventDispatcher<A> {
    /// Consumes deliveries until every publisher is dropped.
    ///
    /// Events are processed one at a time in arrival order, which
    /// serializes replications flowing through this dispatcher. A failed
    /// replication never stops the loop.
    #[tracing::instrument(skip_all, fields(aggregate_type = A::aggregate_type()))]
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            let event_id = event.event_id;
            let event_type = event.event_type;

            match self.engine.replicate(event).await {
                Ok(aggregate) => {
                    metrics::counter!(
                        "dispatched_events_total",
                        "aggregate_type" => A::aggregate_type()
                    )
                    .increment(1);
                    tracing::debug!(
                        %event_id,
                        %event_type,
                        status = %aggregate.status(),
                        "event dispatched"
                    );
                }
                Err(err) => {
                    // The publisher decides whether to redeliver.
                    tracing::warn!(%event_id, %event_type, error = %err, "dispatch failed");
                }
            }
        }

        tracing::debug!("transport drained; dispatcher stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;
    use domain::{AggregateRoot as _, Warehouse, WarehouseEventType, value_objects::Address};
    use event_store::{EventDraft, EventLog, InMemoryEventLog};

    use crate::entity::{EntityService, InMemoryEntityService};
    use crate::machines::warehouse::{self, WarehouseDeps};

    #[tokio::test]
    async fn test_dispatcher_replicates_published_events() {
        let warehouses = Arc::new(InMemoryEntityService::new());
        let events = Arc::new(InMemoryEventLog::new());
        let deps = WarehouseDeps {
            warehouses: warehouses.clone(),
            events: events.clone(),
        };
        let engine = Arc::new(warehouse::engine(&deps).unwrap());

        let unit = Warehouse::new(
            AggregateId::new(),
            Address::new("1 Depot Rd", "Springfield", "IL", "62701", "US"),
        );
        let id = unit.id();
        warehouses.put(unit).await;

        let event = events
            .append(EventDraft::new(WarehouseEventType::WarehouseCreated, id))
            .await
            .unwrap();

        let (publisher, dispatcher) = channel(engine, 8);
        let handle = tokio::spawn(dispatcher.run());

        publisher.publish(event).await.unwrap();
        drop(publisher);
        handle.await.unwrap();

        let stored = warehouses.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status(), domain::WarehouseStatus::WarehouseCreated);
    }

    #[tokio::test]
    async fn test_publish_after_dispatcher_drop_fails() {
        let warehouses = Arc::new(InMemoryEntityService::new());
        let events: Arc<InMemoryEventLog<WarehouseEventType>> = Arc::new(InMemoryEventLog::new());
        let deps = WarehouseDeps {
            warehouses: warehouses.clone(),
            events: events.clone(),
        };
        let engine = Arc::new(warehouse::engine(&deps).unwrap());

        let (publisher, dispatcher) = channel(engine, 1);
        drop(dispatcher);

        let event = EventDraft::new(WarehouseEventType::WarehouseCreated, AggregateId::new())
            .into_event(common::EventId::new(1), chrono::Utc::now());

        assert!(publisher.publish(event).await.is_err());
    }
}
