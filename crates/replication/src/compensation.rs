//! Saga compensation.
//!
//! Compensation is not a separate service: it is the failure path embedded
//! in every workflow action that carries a remote step. When the downstream
//! call fails, the action restores the aggregate's externally-visible
//! status to its pre-attempt value via a direct write, raises the
//! designated failure event for its transition, and re-surfaces the error
//! to the caller of `replicate`.

use std::sync::Arc;

use domain::AggregateRoot;
use event_store::{EventDraft, EventLog};

use crate::entity::EntityService;
use crate::error::Result;

/// Rollback helper shared by compensating workflow actions.
pub struct Compensator<A: AggregateRoot> {
    entities: Arc<dyn EntityService<A>>,
    events: Arc<dyn EventLog<A::EventType>>,
}

impl<A: AggregateRoot> Clone for Compensator<A> {
    fn clone(&self) -> Self {
        Self {
            entities: self.entities.clone(),
            events: self.events.clone(),
        }
    }
}

impl<A: AggregateRoot> Compensator<A> {
    /// Creates a compensator writing through the given collaborators.
    pub fn new(entities: Arc<dyn EntityService<A>>, events: Arc<dyn EventLog<A::EventType>>) -> Self {
        Self { entities, events }
    }

    /// Restores the pre-attempt status and raises the designated failure
    /// event into the aggregate's own log.
    ///
    /// The failure event becomes the next log entry and drives the failure
    /// branch of the saga on its own replication.
    pub async fn roll_back_and_raise(
        &self,
        mut aggregate: A,
        previous_status: A::Status,
        failure_event: A::EventType,
    ) -> Result<A> {
        metrics::counter!("compensations_total", "aggregate_type" => A::aggregate_type())
            .increment(1);
        tracing::warn!(
            aggregate_id = %aggregate.id(),
            restored_status = %previous_status,
            failure_event = %failure_event,
            "compensating failed saga step"
        );

        aggregate.set_status(previous_status);
        let aggregate = self.entities.update(aggregate).await?;
        self.events
            .append(EventDraft::new(failure_event, aggregate.id()))
            .await?;
        Ok(aggregate)
    }

    /// Restores the pre-attempt status without raising an event.
    ///
    /// Used by connect/bookkeeping steps whose transitions have no
    /// designated failure type.
    pub async fn roll_back(&self, mut aggregate: A, previous_status: A::Status) -> Result<A> {
        tracing::warn!(
            aggregate_id = %aggregate.id(),
            restored_status = %previous_status,
            "rolling back failed step"
        );

        aggregate.set_status(previous_status);
        let aggregate = self.entities.update(aggregate).await?;
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;
    use domain::{Payment, PaymentEventType, PaymentMethod, PaymentStatus};
    use domain::value_objects::Money;
    use event_store::InMemoryEventLog;

    use crate::entity::InMemoryEntityService;

    #[tokio::test]
    async fn roll_back_and_raise_restores_status_and_appends_event() {
        let entities = Arc::new(InMemoryEntityService::new());
        let events = Arc::new(InMemoryEventLog::new());
        let compensator: Compensator<Payment> =
            Compensator::new(entities.clone(), events.clone());

        let mut payment = Payment::new(
            AggregateId::new(),
            Money::from_cents(4500),
            PaymentMethod::CreditCard,
        );
        let id = payment.id();
        entities.put(payment.clone()).await;

        // Simulate an attempted processing step.
        payment.set_status(PaymentStatus::PaymentProcessed);

        let restored = compensator
            .roll_back_and_raise(
                payment,
                PaymentStatus::PaymentPending,
                PaymentEventType::PaymentFailed,
            )
            .await
            .unwrap();

        assert_eq!(restored.status(), PaymentStatus::PaymentPending);

        let stored = entities.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status(), PaymentStatus::PaymentPending);

        let types = events.event_types_for(id).await;
        assert_eq!(types, vec![PaymentEventType::PaymentFailed]);
    }

    #[tokio::test]
    async fn roll_back_restores_status_without_event() {
        let entities = Arc::new(InMemoryEntityService::new());
        let events: Arc<InMemoryEventLog<PaymentEventType>> = Arc::new(InMemoryEventLog::new());
        let compensator: Compensator<Payment> =
            Compensator::new(entities.clone(), events.clone());

        let mut payment = Payment::new(
            AggregateId::new(),
            Money::from_cents(100),
            PaymentMethod::DebitCard,
        );
        let id = payment.id();
        entities.put(payment.clone()).await;
        payment.set_status(PaymentStatus::OrderConnected);

        let restored = compensator
            .roll_back(payment, PaymentStatus::PaymentCreated)
            .await
            .unwrap();

        assert_eq!(restored.status(), PaymentStatus::PaymentCreated);
        assert_eq!(events.event_count().await, 0);
        assert!(entities.get(id).await.unwrap().is_some());
    }
}
