//! Inventory state machine and workflow actions.
//!
//! Releasing a reserved unit targets `RESERVATION_PENDING`, not the
//! created state: a released unit goes back into the pool already marked
//! as awaiting its next reservation.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{AggregateRoot, Inventory, InventoryEventType, InventoryStatus};
use event_store::EventLog;
use serde_json::json;
use statemachine::{DefinitionError, MachineDefinition};

use crate::action::{ActionContext, ActionHandle, WorkflowAction};
use crate::compensation::Compensator;
use crate::engine::ReplicationEngine;
use crate::entity::EntityService;
use crate::error::{ReplicationError, Result};
use crate::remote::RemoteAggregateProxy;

use super::{action, id_field, require_link};

/// Collaborators the inventory machine's actions work through.
#[derive(Clone)]
pub struct InventoryDeps {
    pub inventories: Arc<dyn EntityService<Inventory>>,
    pub events: Arc<dyn EventLog<InventoryEventType>>,
    pub remote: Arc<dyn RemoteAggregateProxy>,
}

impl InventoryDeps {
    fn compensator(&self) -> Compensator<Inventory> {
        Compensator::new(self.inventories.clone(), self.events.clone())
    }
}

/// Builds the inventory transition table with its actions wired in.
pub fn machine(
    deps: &InventoryDeps,
) -> std::result::Result<
    MachineDefinition<InventoryStatus, InventoryEventType, ActionHandle<Inventory>>,
    DefinitionError,
> {
    use InventoryEventType as Ev;
    use InventoryStatus as St;

    MachineDefinition::builder(St::InventoryCreated)
        .transition(
            St::InventoryCreated,
            Ev::InventoryCreated,
            St::InventoryCreated,
            action(InventoryCreated::new(deps)),
        )
        .transition(
            St::InventoryCreated,
            Ev::ReservationConnected,
            St::ReservationConnected,
            action(ReservationConnected::new(deps)),
        )
        .transition(
            St::ReservationConnected,
            Ev::InventoryReserved,
            St::InventoryReserved,
            action(InventoryReserved::new(deps)),
        )
        .transition(
            St::InventoryReserved,
            Ev::InventoryReleased,
            St::ReservationPending,
            action(InventoryReleased::new(deps)),
        )
        .build()
}

/// Builds a ready-to-use replication engine for inventory units.
pub fn engine(
    deps: &InventoryDeps,
) -> std::result::Result<ReplicationEngine<Inventory>, DefinitionError> {
    Ok(ReplicationEngine::new(
        machine(deps)?,
        deps.inventories.clone(),
        deps.events.clone(),
    ))
}

/// Refreshes a freshly stocked unit's status cache.
struct InventoryCreated {
    inventories: Arc<dyn EntityService<Inventory>>,
}

impl InventoryCreated {
    fn new(deps: &InventoryDeps) -> Self {
        Self {
            inventories: deps.inventories.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Inventory> for InventoryCreated {
    fn name(&self) -> &'static str {
        "inventory-created"
    }

    async fn execute(
        &self,
        aggregate: Inventory,
        ctx: ActionContext<'_, Inventory>,
    ) -> Result<Inventory> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(inventory_id = %aggregate.id(), "executing workflow for inventory created");
        Ok(self.inventories.update(aggregate).await?)
    }
}

/// Attaches the reservation that claimed this unit.
struct ReservationConnected {
    inventories: Arc<dyn EntityService<Inventory>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Inventory>,
}

impl ReservationConnected {
    fn new(deps: &InventoryDeps) -> Self {
        Self {
            inventories: deps.inventories.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Inventory> for ReservationConnected {
    fn name(&self) -> &'static str {
        "reservation-connected"
    }

    async fn execute(
        &self,
        mut aggregate: Inventory,
        ctx: ActionContext<'_, Inventory>,
    ) -> Result<Inventory> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(inventory_id = %aggregate.id(), "executing workflow for reservation connected");

        let link = require_link::<Inventory>(ctx.event, "reservation", self.name())?;
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

        let reservation_id = id_field(&body, "reservationId").ok_or_else(|| {
            ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "reservation representation carries no reservationId".to_string(),
            }
        })?;

        aggregate.connect_reservation(reservation_id);
        Ok(self.inventories.update(aggregate).await?)
    }
}

/// Confirms the hold with the connected reservation.
///
/// A confirmation that cannot reach the reservation releases the unit
/// again: the pre-attempt status is restored and `INVENTORY_RELEASED` is
/// raised.
struct InventoryReserved {
    inventories: Arc<dyn EntityService<Inventory>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Inventory>,
}

impl InventoryReserved {
    fn new(deps: &InventoryDeps) -> Self {
        Self {
            inventories: deps.inventories.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Inventory> for InventoryReserved {
    fn name(&self) -> &'static str {
        "inventory-reserved"
    }

    async fn execute(
        &self,
        aggregate: Inventory,
        ctx: ActionContext<'_, Inventory>,
    ) -> Result<Inventory> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(inventory_id = %aggregate.id(), "executing workflow for inventory reserved");

        if aggregate.reservation_id().is_none() {
            return Err(ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "no reservation connected to this unit".to_string(),
            });
        }

        let link = require_link::<Inventory>(ctx.event, "reservation", self.name())?;
        let params = json!({ "inventoryId": aggregate.id().to_string() });

        match self
            .remote
            .execute(link, &["commands", "confirmReservation"], params)
            .await
        {
            Ok(_) => Ok(self.inventories.update(aggregate).await?),
            Err(cause) => {
                self.compensator
                    .roll_back_and_raise(
                        aggregate,
                        ctx.previous_status,
                        InventoryEventType::InventoryReleased,
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

/// Returns the unit to the reservable pool.
struct InventoryReleased {
    inventories: Arc<dyn EntityService<Inventory>>,
}

impl InventoryReleased {
    fn new(deps: &InventoryDeps) -> Self {
        Self {
            inventories: deps.inventories.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Inventory> for InventoryReleased {
    fn name(&self) -> &'static str {
        "inventory-released"
    }

    async fn execute(
        &self,
        mut aggregate: Inventory,
        ctx: ActionContext<'_, Inventory>,
    ) -> Result<Inventory> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(inventory_id = %aggregate.id(), "executing workflow for inventory released");

        aggregate.release();
        Ok(self.inventories.update(aggregate).await?)
    }
}
