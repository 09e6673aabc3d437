use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// OrderCreated ──► AccountConnected ──► ReservationPending ──┬──► ReservationSucceeded
///                        │                                   └──► ReservationFailed
///                        └──► PaymentCreated ──► PaymentConnected ──► PaymentPending ──┬──► PaymentSucceeded
///                                                                                     └──► PaymentFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order exists; nothing connected yet.
    #[default]
    OrderCreated,

    /// An account has been connected to the order.
    AccountConnected,

    /// A stock reservation has been requested from a warehouse.
    ReservationPending,

    /// The reservation was fulfilled.
    ReservationSucceeded,

    /// The reservation could not be fulfilled (terminal).
    ReservationFailed,

    /// A payment resource has been created for the order.
    PaymentCreated,

    /// The payment has been connected back to the order.
    PaymentConnected,

    /// The payment is awaiting processing.
    PaymentPending,

    /// The payment settled (terminal).
    PaymentSucceeded,

    /// The payment was declined (terminal).
    PaymentFailed,
}

impl OrderStatus {
    /// Returns true if a reservation may be requested from this status.
    pub fn can_request_reservation(&self) -> bool {
        matches!(self, OrderStatus::AccountConnected)
    }

    /// Returns true if a payment may be created from this status.
    pub fn can_create_payment(&self) -> bool {
        matches!(self, OrderStatus::AccountConnected)
    }

    /// Returns true if this status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::ReservationSucceeded
                | OrderStatus::ReservationFailed
                | OrderStatus::PaymentSucceeded
                | OrderStatus::PaymentFailed
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrderCreated => "ORDER_CREATED",
            OrderStatus::AccountConnected => "ACCOUNT_CONNECTED",
            OrderStatus::ReservationPending => "RESERVATION_PENDING",
            OrderStatus::ReservationSucceeded => "RESERVATION_SUCCEEDED",
            OrderStatus::ReservationFailed => "RESERVATION_FAILED",
            OrderStatus::PaymentCreated => "PAYMENT_CREATED",
            OrderStatus::PaymentConnected => "PAYMENT_CONNECTED",
            OrderStatus::PaymentPending => "PAYMENT_PENDING",
            OrderStatus::PaymentSucceeded => "PAYMENT_SUCCEEDED",
            OrderStatus::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
