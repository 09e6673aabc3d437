//! Warehouse state machine and workflow action.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{AggregateRoot, Warehouse, WarehouseEventType, WarehouseStatus};
use event_store::EventLog;
use statemachine::{DefinitionError, MachineDefinition};

use crate::action::{ActionContext, ActionHandle, WorkflowAction};
use crate::engine::ReplicationEngine;
use crate::entity::EntityService;
use crate::error::Result;

use super::action;

/// Collaborators the warehouse machine's action works through.
#[derive(Clone)]
pub struct WarehouseDeps {
    pub warehouses: Arc<dyn EntityService<Warehouse>>,
    pub events: Arc<dyn EventLog<WarehouseEventType>>,
}

/// Builds the warehouse transition table: a single self-transition.
pub fn machine(
    deps: &WarehouseDeps,
) -> std::result::Result<
    MachineDefinition<WarehouseStatus, WarehouseEventType, ActionHandle<Warehouse>>,
    DefinitionError,
> {
    MachineDefinition::builder(WarehouseStatus::WarehouseCreated)
        .transition(
            WarehouseStatus::WarehouseCreated,
            WarehouseEventType::WarehouseCreated,
            WarehouseStatus::WarehouseCreated,
            action(WarehouseCreated::new(deps)),
        )
        .build()
}

/// Builds a ready-to-use replication engine for warehouses.
pub fn engine(
    deps: &WarehouseDeps,
) -> std::result::Result<ReplicationEngine<Warehouse>, DefinitionError> {
    Ok(ReplicationEngine::new(
        machine(deps)?,
        deps.warehouses.clone(),
        deps.events.clone(),
    ))
}

/// Refreshes a freshly created warehouse's status cache.
struct WarehouseCreated {
    warehouses: Arc<dyn EntityService<Warehouse>>,
}

impl WarehouseCreated {
    fn new(deps: &WarehouseDeps) -> Self {
        Self {
            warehouses: deps.warehouses.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Warehouse> for WarehouseCreated {
    fn name(&self) -> &'static str {
        "warehouse-created"
    }

    async fn execute(
        &self,
        aggregate: Warehouse,
        ctx: ActionContext<'_, Warehouse>,
    ) -> Result<Warehouse> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(warehouse_id = %aggregate.id(), "executing workflow for warehouse created");
        Ok(self.warehouses.update(aggregate).await?)
    }
}
