//! The replication engine.

use std::sync::Arc;
use std::time::Instant;

use domain::AggregateRoot;
use event_store::{Event, EventLog};
use statemachine::{Machine, MachineDefinition, Step};

use crate::action::{ActionContext, ActionHandle};
use crate::entity::EntityService;
use crate::error::{ReplicationError, Result};

/// Replays an aggregate's event log through its domain's state machine and
/// fires exactly one side-effecting workflow action per call.
///
/// One engine exists per domain, constructed at startup from the domain's
/// [`MachineDefinition`] (with its action instances already wired in) and
/// the two collaborator boundaries. The engine itself holds no mutable
/// state: every [`replicate`](ReplicationEngine::replicate) call builds a
/// fresh, disposable [`Machine`] instance, which is what makes concurrent
/// replications safe without locking the replay.
pub struct ReplicationEngine<A: AggregateRoot> {
    definition: MachineDefinition<A::Status, A::EventType, ActionHandle<A>>,
    entities: Arc<dyn EntityService<A>>,
    events: Arc<dyn EventLog<A::EventType>>,
}

impl<A: AggregateRoot> ReplicationEngine<A> {
    /// Creates an engine for one domain.
    pub fn new(
        definition: MachineDefinition<A::Status, A::EventType, ActionHandle<A>>,
        entities: Arc<dyn EntityService<A>>,
        events: Arc<dyn EventLog<A::EventType>>,
    ) -> Self {
        Self {
            definition,
            entities,
            events,
        }
    }

    /// Replicates the aggregate referenced by the given newly-appended
    /// event and returns the resulting snapshot.
    ///
    /// The full log is re-walked in `created_at` order through a fresh
    /// state machine. Historical entries fold the status without external
    /// effects; the entry matching `event.event_id` additionally fires its
    /// workflow action's side effects. Replay is deterministic for a fixed
    /// log, so redelivery of the same event is tolerated to the extent the
    /// triggering action's remote step is itself idempotent.
    #[tracing::instrument(
        skip_all,
        fields(
            aggregate_type = A::aggregate_type(),
            entity_id = %event.entity_id,
            event_id = %event.event_id,
            event_type = %event.event_type,
        )
    )]
    pub async fn replicate(&self, event: Event<A::EventType>) -> Result<A> {
        let started = Instant::now();
        metrics::counter!("replications_total", "aggregate_type" => A::aggregate_type())
            .increment(1);

        let mut aggregate = self
            .entities
            .get(event.entity_id)
            .await?
            .ok_or(ReplicationError::AggregateNotFound(event.entity_id))?;

        let mut history = self.events.find_by_entity(event.entity_id).await?;

        // The delivered event may race the log read; treat the delivered
        // copy as the final entry in that case.
        if !history.iter().any(|e| e.event_id == event.event_id) {
            history.push(event.clone());
        }

        tracing::debug!(events = history.len(), "replicating aggregate state");

        let mut machine = Machine::new(&self.definition);
        aggregate.set_status(machine.state());

        for entry in &history {
            let is_triggering = entry.event_id == event.event_id;

            match machine.fire(entry.event_type) {
                Step::Skipped { state, event: skipped } => {
                    if is_triggering {
                        metrics::counter!(
                            "replication_failures_total",
                            "aggregate_type" => A::aggregate_type()
                        )
                        .increment(1);
                        return Err(ReplicationError::NoApplicableTransition {
                            status: state.to_string(),
                            event_type: skipped.to_string(),
                        });
                    }
                    // Tolerates out-of-order or duplicate-type entries
                    // without aborting the rest of the replay.
                    tracing::debug!(state = %state, event_type = %skipped, "event skipped");
                }
                Step::Applied(transition) => {
                    let previous_status = aggregate.status();
                    aggregate.set_status(transition.target);

                    if let Some(action) = &transition.action {
                        let ctx = ActionContext {
                            event: entry,
                            is_triggering,
                            previous_status,
                        };
                        match action.execute(aggregate, ctx).await {
                            Ok(updated) => aggregate = updated,
                            Err(err) => {
                                // A failure anywhere in the replay means the
                                // computed snapshot cannot be trusted.
                                metrics::counter!(
                                    "replication_failures_total",
                                    "aggregate_type" => A::aggregate_type()
                                )
                                .increment(1);
                                tracing::warn!(
                                    action = action.name(),
                                    error = %err,
                                    "workflow action failed"
                                );
                                return Err(err);
                            }
                        }
                    }
                }
            }
        }

        metrics::histogram!(
            "replication_duration_seconds",
            "aggregate_type" => A::aggregate_type()
        )
        .record(started.elapsed().as_secs_f64());
        tracing::info!(status = %aggregate.status(), "replication completed");

        Ok(aggregate)
    }
}
