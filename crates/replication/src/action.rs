//! The workflow action contract.

use std::sync::Arc;

use async_trait::async_trait;
use domain::AggregateRoot;
use event_store::Event;

use crate::Result;

/// Everything an action needs to know about the replay step invoking it.
///
/// `is_triggering` is threaded explicitly: an action performs its real side
/// effects (remote calls, writes) only when it is true. During historical
/// replay actions must be no-ops with respect to external effects, which is
/// what prevents re-running already-completed saga steps on every replay.
pub struct ActionContext<'a, A: AggregateRoot> {
    /// The log entry currently being replayed.
    pub event: &'a Event<A::EventType>,

    /// True iff this entry is the newly-arrived event the replication was
    /// called for.
    pub is_triggering: bool,

    /// The aggregate's status before this transition applied; the value
    /// compensation restores on a failed remote step.
    pub previous_status: A::Status,
}

/// One saga step, attached to exactly one transition of a domain's state
/// machine.
///
/// An action is a function `(aggregate, event, isTriggering) -> aggregate`.
/// The engine folds the transition's target status into the snapshot before
/// invoking it; a triggering action then validates preconditions, performs
/// its remote step, writes the refreshed aggregate through the entity
/// service, and raises the outcome event that drives the next replication.
#[async_trait]
pub trait WorkflowAction<A: AggregateRoot>: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Executes the step against the current snapshot.
    async fn execute(&self, aggregate: A, ctx: ActionContext<'_, A>) -> Result<A>;
}

/// Shared handle to a constructed action instance, as stored in transition
/// tables.
pub type ActionHandle<A> = Arc<dyn WorkflowAction<A>>;
