//! Warehouse aggregate, statuses, and event types.

use common::AggregateId;
use event_store::EventKind;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRoot;
use crate::value_objects::Address;

/// The lifecycle status of a warehouse. A single-state machine: creation
/// is the only event in a warehouse's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseStatus {
    #[default]
    WarehouseCreated,
}

impl WarehouseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseStatus::WarehouseCreated => "WAREHOUSE_CREATED",
        }
    }
}

impl std::fmt::Display for WarehouseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events recorded against a warehouse's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseEventType {
    WarehouseCreated,
}

impl EventKind for WarehouseEventType {
    fn as_str(&self) -> &'static str {
        match self {
            WarehouseEventType::WarehouseCreated => "WAREHOUSE_CREATED",
        }
    }
}

impl std::fmt::Display for WarehouseEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The warehouse aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    id: AggregateId,
    address: Address,
    status: WarehouseStatus,
}

impl Warehouse {
    pub fn new(id: AggregateId, address: Address) -> Self {
        Self {
            id,
            address,
            status: WarehouseStatus::default(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl AggregateRoot for Warehouse {
    type Status = WarehouseStatus;
    type EventType = WarehouseEventType;

    fn aggregate_type() -> &'static str {
        "Warehouse"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn status(&self) -> WarehouseStatus {
        self.status
    }

    fn set_status(&mut self, status: WarehouseStatus) {
        self.status = status;
    }
}
