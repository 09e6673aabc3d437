//! Reservation aggregate, statuses, and event types.
//!
//! A reservation is the warehouse-side counterpart of an order's
//! reservation leg: it is requested on an order's behalf, connected to the
//! order and a specific inventory unit, and finally succeeds or fails.

use common::AggregateId;
use event_store::EventKind;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRoot;
use crate::value_objects::ProductId;

/// The lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    ReservationCreated,
    ReservationPending,
    OrderConnected,
    InventoryConnected,
    ReservationSucceeded,
    ReservationFailed,
}

impl ReservationStatus {
    /// Returns true if this status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::ReservationSucceeded | ReservationStatus::ReservationFailed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::ReservationCreated => "RESERVATION_CREATED",
            ReservationStatus::ReservationPending => "RESERVATION_PENDING",
            ReservationStatus::OrderConnected => "ORDER_CONNECTED",
            ReservationStatus::InventoryConnected => "INVENTORY_CONNECTED",
            ReservationStatus::ReservationSucceeded => "RESERVATION_SUCCEEDED",
            ReservationStatus::ReservationFailed => "RESERVATION_FAILED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events recorded against a reservation's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationEventType {
    ReservationCreated,
    ReservationRequested,
    OrderConnected,
    InventoryConnected,
    ReservationSucceeded,
    ReservationFailed,
}

impl EventKind for ReservationEventType {
    fn as_str(&self) -> &'static str {
        match self {
            ReservationEventType::ReservationCreated => "RESERVATION_CREATED",
            ReservationEventType::ReservationRequested => "RESERVATION_REQUESTED",
            ReservationEventType::OrderConnected => "ORDER_CONNECTED",
            ReservationEventType::InventoryConnected => "INVENTORY_CONNECTED",
            ReservationEventType::ReservationSucceeded => "RESERVATION_SUCCEEDED",
            ReservationEventType::ReservationFailed => "RESERVATION_FAILED",
        }
    }
}

impl std::fmt::Display for ReservationEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The reservation aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    id: AggregateId,
    product_id: ProductId,
    order_id: Option<AggregateId>,
    inventory_id: Option<AggregateId>,
    status: ReservationStatus,
}

impl Reservation {
    /// Creates a reservation for one unit of the given product.
    pub fn new(id: AggregateId, product_id: impl Into<ProductId>) -> Self {
        Self {
            id,
            product_id: product_id.into(),
            order_id: None,
            inventory_id: None,
            status: ReservationStatus::default(),
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn order_id(&self) -> Option<AggregateId> {
        self.order_id
    }

    /// Connects the order this reservation serves.
    pub fn connect_order(&mut self, order_id: AggregateId) {
        self.order_id = Some(order_id);
    }

    pub fn inventory_id(&self) -> Option<AggregateId> {
        self.inventory_id
    }

    /// Connects the inventory unit satisfying this reservation.
    pub fn connect_inventory(&mut self, inventory_id: AggregateId) {
        self.inventory_id = Some(inventory_id);
    }
}

impl AggregateRoot for Reservation {
    type Status = ReservationStatus;
    type EventType = ReservationEventType;

    fn aggregate_type() -> &'static str {
        "Reservation"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn status(&self) -> ReservationStatus {
        self.status
    }

    fn set_status(&mut self, status: ReservationStatus) {
        self.status = status;
    }
}
