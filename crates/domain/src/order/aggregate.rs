use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRoot;
use crate::value_objects::{Address, Money, ProductId};

use super::{OrderEventType, OrderStatus};

/// One product line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Price of the full line (quantity × unit price).
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.unit_price.cents() * i64::from(self.quantity))
    }
}

/// The order aggregate.
///
/// References to the connected account, payment, and reservations are
/// weak identifiers established by workflow actions as the saga advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: AggregateId,
    account_id: Option<AggregateId>,
    payment_id: Option<AggregateId>,
    reservation_ids: Vec<AggregateId>,
    line_items: Vec<LineItem>,
    shipping_address: Option<Address>,
    status: OrderStatus,
}

impl Order {
    /// Creates an order in its initial status with no connections.
    pub fn new(id: AggregateId, line_items: Vec<LineItem>) -> Self {
        Self {
            id,
            account_id: None,
            payment_id: None,
            reservation_ids: Vec::new(),
            line_items,
            shipping_address: None,
            status: OrderStatus::default(),
        }
    }

    /// Sets the shipping address.
    pub fn with_shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn account_id(&self) -> Option<AggregateId> {
        self.account_id
    }

    /// Connects the owning account.
    pub fn connect_account(&mut self, account_id: AggregateId) {
        self.account_id = Some(account_id);
    }

    pub fn payment_id(&self) -> Option<AggregateId> {
        self.payment_id
    }

    /// Connects the payment created for this order.
    pub fn connect_payment(&mut self, payment_id: AggregateId) {
        self.payment_id = Some(payment_id);
    }

    pub fn reservation_ids(&self) -> &[AggregateId] {
        &self.reservation_ids
    }

    /// Records a reservation requested on the order's behalf.
    pub fn add_reservation(&mut self, reservation_id: AggregateId) {
        self.reservation_ids.push(reservation_id);
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn has_line_items(&self) -> bool {
        !self.line_items.is_empty()
    }

    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    /// Sum of all line totals.
    pub fn total_amount(&self) -> Money {
        self.line_items
            .iter()
            .fold(Money::zero(), |total, item| total + item.total_price())
    }
}

impl AggregateRoot for Order {
    type Status = OrderStatus;
    type EventType = OrderEventType;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn status(&self) -> OrderStatus {
        self.status
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}
