//! Reservation state machine and workflow actions.
//!
//! A reservation is requested on an order's behalf, connected to the order
//! and then to a concrete inventory unit. Connecting the inventory is the
//! remote step that actually places the hold; its failure compensates with
//! `RESERVATION_FAILED`, which the order-side saga leg mirrors.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{AggregateRoot, Reservation, ReservationEventType, ReservationStatus};
use event_store::{EventDraft, EventLog};
use serde_json::json;
use statemachine::{DefinitionError, MachineDefinition};

use crate::action::{ActionContext, ActionHandle, WorkflowAction};
use crate::compensation::Compensator;
use crate::engine::ReplicationEngine;
use crate::entity::EntityService;
use crate::error::{ReplicationError, Result};
use crate::remote::RemoteAggregateProxy;

use super::{action, id_field, require_link};

/// Collaborators the reservation machine's actions work through.
#[derive(Clone)]
pub struct ReservationDeps {
    pub reservations: Arc<dyn EntityService<Reservation>>,
    pub events: Arc<dyn EventLog<ReservationEventType>>,
    pub remote: Arc<dyn RemoteAggregateProxy>,
}

impl ReservationDeps {
    fn compensator(&self) -> Compensator<Reservation> {
        Compensator::new(self.reservations.clone(), self.events.clone())
    }
}

/// Builds the reservation transition table with its actions wired in.
pub fn machine(
    deps: &ReservationDeps,
) -> std::result::Result<
    MachineDefinition<ReservationStatus, ReservationEventType, ActionHandle<Reservation>>,
    DefinitionError,
> {
    use ReservationEventType as Ev;
    use ReservationStatus as St;

    MachineDefinition::builder(St::ReservationCreated)
        .transition(
            St::ReservationCreated,
            Ev::ReservationCreated,
            St::ReservationCreated,
            action(ReservationCreated::new(deps)),
        )
        .transition(
            St::ReservationCreated,
            Ev::ReservationRequested,
            St::ReservationPending,
            action(ReservationRequested::new(deps)),
        )
        .transition(
            St::ReservationPending,
            Ev::OrderConnected,
            St::OrderConnected,
            action(OrderConnected::new(deps)),
        )
        .transition(
            St::OrderConnected,
            Ev::InventoryConnected,
            St::InventoryConnected,
            action(InventoryConnected::new(deps)),
        )
        .transition(
            St::InventoryConnected,
            Ev::ReservationSucceeded,
            St::ReservationSucceeded,
            action(ReservationSucceeded::new(deps)),
        )
        .transition(
            St::OrderConnected,
            Ev::ReservationFailed,
            St::ReservationFailed,
            action(ReservationFailed::new(deps)),
        )
        .build()
}

/// Builds a ready-to-use replication engine for reservations.
pub fn engine(
    deps: &ReservationDeps,
) -> std::result::Result<ReplicationEngine<Reservation>, DefinitionError> {
    Ok(ReplicationEngine::new(
        machine(deps)?,
        deps.reservations.clone(),
        deps.events.clone(),
    ))
}

/// Refreshes a freshly created reservation's status cache.
struct ReservationCreated {
    reservations: Arc<dyn EntityService<Reservation>>,
}

impl ReservationCreated {
    fn new(deps: &ReservationDeps) -> Self {
        Self {
            reservations: deps.reservations.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Reservation> for ReservationCreated {
    fn name(&self) -> &'static str {
        "reservation-created"
    }

    async fn execute(
        &self,
        aggregate: Reservation,
        ctx: ActionContext<'_, Reservation>,
    ) -> Result<Reservation> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(reservation_id = %aggregate.id(), "executing workflow for reservation created");
        Ok(self.reservations.update(aggregate).await?)
    }
}

/// Marks the reservation as awaiting fulfillment.
struct ReservationRequested {
    reservations: Arc<dyn EntityService<Reservation>>,
}

impl ReservationRequested {
    fn new(deps: &ReservationDeps) -> Self {
        Self {
            reservations: deps.reservations.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Reservation> for ReservationRequested {
    fn name(&self) -> &'static str {
        "reservation-requested"
    }

    async fn execute(
        &self,
        aggregate: Reservation,
        ctx: ActionContext<'_, Reservation>,
    ) -> Result<Reservation> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(reservation_id = %aggregate.id(), "executing workflow for reservation requested");
        Ok(self.reservations.update(aggregate).await?)
    }
}

/// Resolves the requesting order and records the connection.
struct OrderConnected {
    reservations: Arc<dyn EntityService<Reservation>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Reservation>,
}

impl OrderConnected {
    fn new(deps: &ReservationDeps) -> Self {
        Self {
            reservations: deps.reservations.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Reservation> for OrderConnected {
    fn name(&self) -> &'static str {
        "order-connected"
    }

    async fn execute(
        &self,
        mut aggregate: Reservation,
        ctx: ActionContext<'_, Reservation>,
    ) -> Result<Reservation> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(reservation_id = %aggregate.id(), "executing workflow for order connected");

        let link = require_link::<Reservation>(ctx.event, "order", self.name())?;
        let body = match self.remote.follow(link, &["self"]).await {
            Ok(body) => body,
            Err(cause) => {
                self.compensator
                    .roll_back(aggregate, ctx.previous_status)
                    .await?;
                return Err(ReplicationError::RemoteStepFailure {
                    action: self.name(),
                    source: cause,
                });
            }
        };

        let order_id =
            id_field(&body, "orderId").ok_or_else(|| ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "order representation carries no orderId".to_string(),
            })?;

        aggregate.connect_order(order_id);
        Ok(self.reservations.update(aggregate).await?)
    }
}

/// Places the hold on the linked inventory unit.
///
/// Success raises `RESERVATION_SUCCEEDED` into the reservation's own log;
/// failure compensates with `RESERVATION_FAILED`.
struct InventoryConnected {
    reservations: Arc<dyn EntityService<Reservation>>,
    events: Arc<dyn EventLog<ReservationEventType>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Reservation>,
}

impl InventoryConnected {
    fn new(deps: &ReservationDeps) -> Self {
        Self {
            reservations: deps.reservations.clone(),
            events: deps.events.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Reservation> for InventoryConnected {
    fn name(&self) -> &'static str {
        "inventory-connected"
    }

    async fn execute(
        &self,
        mut aggregate: Reservation,
        ctx: ActionContext<'_, Reservation>,
    ) -> Result<Reservation> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(reservation_id = %aggregate.id(), "executing workflow for inventory connected");

        if aggregate.order_id().is_none() {
            return Err(ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "reservation is not connected to an order".to_string(),
            });
        }

        let link = require_link::<Reservation>(ctx.event, "inventory", self.name())?;
        let params = json!({ "reservationId": aggregate.id().to_string() });

        match self.remote.execute(link, &["commands", "reserve"], params).await {
            Ok(body) => {
                if let Some(inventory_id) = id_field(&body, "inventoryId") {
                    aggregate.connect_inventory(inventory_id);
                }
                let aggregate = self.reservations.update(aggregate).await?;
                self.events
                    .append(EventDraft::new(
                        ReservationEventType::ReservationSucceeded,
                        aggregate.id(),
                    ))
                    .await?;
                Ok(aggregate)
            }
            Err(cause) => {
                self.compensator
                    .roll_back_and_raise(
                        aggregate,
                        ctx.previous_status,
                        ReservationEventType::ReservationFailed,
                    )
                    .await?;
                Err(ReplicationError::RemoteStepFailure {
                    action: self.name(),
                    source: cause,
                })
            }
        }
    }
}

/// Reports the fulfilled reservation back to the requesting order.
struct ReservationSucceeded {
    reservations: Arc<dyn EntityService<Reservation>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Reservation>,
}

impl ReservationSucceeded {
    fn new(deps: &ReservationDeps) -> Self {
        Self {
            reservations: deps.reservations.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Reservation> for ReservationSucceeded {
    fn name(&self) -> &'static str {
        "reservation-succeeded"
    }

    async fn execute(
        &self,
        aggregate: Reservation,
        ctx: ActionContext<'_, Reservation>,
    ) -> Result<Reservation> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(reservation_id = %aggregate.id(), "executing workflow for reservation succeeded");

        if let Some(link) = ctx.event.link("order") {
            let params = json!({ "reservationId": aggregate.id().to_string() });
            if let Err(cause) = self
                .remote
                .execute(link, &["commands", "completeReservation"], params)
                .await
            {
                self.compensator
                    .roll_back(aggregate, ctx.previous_status)
                    .await?;
                return Err(ReplicationError::RemoteStepFailure {
                    action: self.name(),
                    source: cause,
                });
            }
        }

        Ok(self.reservations.update(aggregate).await?)
    }
}

/// Records the failed reservation.
struct ReservationFailed {
    reservations: Arc<dyn EntityService<Reservation>>,
}

impl ReservationFailed {
    fn new(deps: &ReservationDeps) -> Self {
        Self {
            reservations: deps.reservations.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Reservation> for ReservationFailed {
    fn name(&self) -> &'static str {
        "reservation-failed"
    }

    async fn execute(
        &self,
        aggregate: Reservation,
        ctx: ActionContext<'_, Reservation>,
    ) -> Result<Reservation> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(reservation_id = %aggregate.id(), "executing workflow for reservation failed");
        Ok(self.reservations.update(aggregate).await?)
    }
}
