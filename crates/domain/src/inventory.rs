//! Inventory aggregate, statuses, and event types.
//!
//! One inventory record tracks a single physical unit of stock in a
//! warehouse. Releasing a reserved unit returns it to the reservable pool.

use common::AggregateId;
use event_store::EventKind;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRoot;
use crate::value_objects::ProductId;

/// The lifecycle status of an inventory unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStatus {
    #[default]
    InventoryCreated,
    ReservationPending,
    ReservationConnected,
    InventoryReserved,
    InventoryReleased,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::InventoryCreated => "INVENTORY_CREATED",
            InventoryStatus::ReservationPending => "RESERVATION_PENDING",
            InventoryStatus::ReservationConnected => "RESERVATION_CONNECTED",
            InventoryStatus::InventoryReserved => "INVENTORY_RESERVED",
            InventoryStatus::InventoryReleased => "INVENTORY_RELEASED",
        }
    }
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events recorded against an inventory unit's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryEventType {
    InventoryCreated,
    ReservationConnected,
    InventoryReserved,
    InventoryReleased,
}

impl EventKind for InventoryEventType {
    fn as_str(&self) -> &'static str {
        match self {
            InventoryEventType::InventoryCreated => "INVENTORY_CREATED",
            InventoryEventType::ReservationConnected => "RESERVATION_CONNECTED",
            InventoryEventType::InventoryReserved => "INVENTORY_RESERVED",
            InventoryEventType::InventoryReleased => "INVENTORY_RELEASED",
        }
    }
}

impl std::fmt::Display for InventoryEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The inventory aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    id: AggregateId,
    product_id: ProductId,
    warehouse_id: AggregateId,
    reservation_id: Option<AggregateId>,
    status: InventoryStatus,
}

impl Inventory {
    /// Creates an inventory unit held by a warehouse.
    pub fn new(id: AggregateId, product_id: impl Into<ProductId>, warehouse_id: AggregateId) -> Self {
        Self {
            id,
            product_id: product_id.into(),
            warehouse_id,
            reservation_id: None,
            status: InventoryStatus::default(),
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn warehouse_id(&self) -> AggregateId {
        self.warehouse_id
    }

    pub fn reservation_id(&self) -> Option<AggregateId> {
        self.reservation_id
    }

    /// Connects the reservation holding this unit.
    pub fn connect_reservation(&mut self, reservation_id: AggregateId) {
        self.reservation_id = Some(reservation_id);
    }

    /// Detaches the reservation, returning the unit to the pool.
    pub fn release(&mut self) {
        self.reservation_id = None;
    }
}

impl AggregateRoot for Inventory {
    type Status = InventoryStatus;
    type EventType = InventoryEventType;

    fn aggregate_type() -> &'static str {
        "Inventory"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn status(&self) -> InventoryStatus {
        self.status
    }

    fn set_status(&mut self, status: InventoryStatus) {
        self.status = status;
    }
}
