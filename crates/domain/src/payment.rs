//! Payment aggregate, statuses, and event types.

use common::AggregateId;
use event_store::EventKind;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRoot;
use crate::value_objects::Money;

/// The lifecycle status of a payment.
///
/// `PaymentProcessed` records that a charge has been attempted; whether it
/// settled or was declined arrives as a follow-up event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    PaymentCreated,
    OrderConnected,
    PaymentPending,
    PaymentProcessed,
    PaymentSucceeded,
    PaymentFailed,
}

impl PaymentStatus {
    /// Returns true if the payment can be processed from this status.
    pub fn can_process(&self) -> bool {
        matches!(self, PaymentStatus::PaymentPending)
    }

    /// Returns true if this status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::PaymentSucceeded | PaymentStatus::PaymentFailed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::PaymentCreated => "PAYMENT_CREATED",
            PaymentStatus::OrderConnected => "ORDER_CONNECTED",
            PaymentStatus::PaymentPending => "PAYMENT_PENDING",
            PaymentStatus::PaymentProcessed => "PAYMENT_PROCESSED",
            PaymentStatus::PaymentSucceeded => "PAYMENT_SUCCEEDED",
            PaymentStatus::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events recorded against a payment's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentEventType {
    PaymentCreated,
    OrderConnected,
    PaymentPending,
    PaymentProcessed,
    PaymentSucceeded,
    PaymentFailed,
}

impl EventKind for PaymentEventType {
    fn as_str(&self) -> &'static str {
        match self {
            PaymentEventType::PaymentCreated => "PAYMENT_CREATED",
            PaymentEventType::OrderConnected => "ORDER_CONNECTED",
            PaymentEventType::PaymentPending => "PAYMENT_PENDING",
            PaymentEventType::PaymentProcessed => "PAYMENT_PROCESSED",
            PaymentEventType::PaymentSucceeded => "PAYMENT_SUCCEEDED",
            PaymentEventType::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl std::fmt::Display for PaymentEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a payment is funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
}

/// The payment aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    id: AggregateId,
    amount: Money,
    payment_method: PaymentMethod,
    order_id: Option<AggregateId>,
    status: PaymentStatus,
}

impl Payment {
    /// Creates a payment in its initial status, not yet connected to an
    /// order.
    pub fn new(id: AggregateId, amount: Money, payment_method: PaymentMethod) -> Self {
        Self {
            id,
            amount,
            payment_method,
            order_id: None,
            status: PaymentStatus::default(),
        }
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn order_id(&self) -> Option<AggregateId> {
        self.order_id
    }

    /// Connects the order this payment settles.
    pub fn connect_order(&mut self, order_id: AggregateId) {
        self.order_id = Some(order_id);
    }
}

impl AggregateRoot for Payment {
    type Status = PaymentStatus;
    type EventType = PaymentEventType;

    fn aggregate_type() -> &'static str {
        "Payment"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn status(&self) -> PaymentStatus {
        self.status
    }

    fn set_status(&mut self, status: PaymentStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_payment_starts_created() {
        let payment = Payment::new(
            AggregateId::new(),
            Money::from_cents(4500),
            PaymentMethod::CreditCard,
        );
        assert_eq!(payment.status(), PaymentStatus::PaymentCreated);
        assert!(payment.order_id().is_none());
    }

    #[test]
    fn only_pending_payments_process() {
        assert!(PaymentStatus::PaymentPending.can_process());
        assert!(!PaymentStatus::PaymentCreated.can_process());
        assert!(!PaymentStatus::PaymentProcessed.can_process());
    }

    #[test]
    fn terminal_statuses() {
        assert!(PaymentStatus::PaymentSucceeded.is_terminal());
        assert!(PaymentStatus::PaymentFailed.is_terminal());
        assert!(!PaymentStatus::PaymentProcessed.is_terminal());
    }

    #[test]
    fn wire_format() {
        let json = serde_json::to_string(&PaymentEventType::PaymentProcessed).unwrap();
        assert_eq!(json, "\"PAYMENT_PROCESSED\"");
        let method = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(method, "\"CREDIT_CARD\"");
    }
}
