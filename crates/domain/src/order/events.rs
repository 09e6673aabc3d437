use event_store::EventKind;
use serde::{Deserialize, Serialize};

/// Events recorded against an order's log.
///
/// Several of these are raised by *other* services (the warehouse raises
/// `RESERVATION_SUCCEEDED`, the payment service raises `PAYMENT_SUCCEEDED`)
/// into the order's log; the order only learns of them on replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    AccountConnected,
    ReservationPending,
    ReservationSucceeded,
    ReservationFailed,
    PaymentCreated,
    PaymentConnected,
    PaymentPending,
    PaymentSucceeded,
    PaymentFailed,
}

impl EventKind for OrderEventType {
    fn as_str(&self) -> &'static str {
        match self {
            OrderEventType::OrderCreated => "ORDER_CREATED",
            OrderEventType::AccountConnected => "ACCOUNT_CONNECTED",
            OrderEventType::ReservationPending => "RESERVATION_PENDING",
            OrderEventType::ReservationSucceeded => "RESERVATION_SUCCEEDED",
            OrderEventType::ReservationFailed => "RESERVATION_FAILED",
            OrderEventType::PaymentCreated => "PAYMENT_CREATED",
            OrderEventType::PaymentConnected => "PAYMENT_CONNECTED",
            OrderEventType::PaymentPending => "PAYMENT_PENDING",
            OrderEventType::PaymentSucceeded => "PAYMENT_SUCCEEDED",
            OrderEventType::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(OrderEventType::AccountConnected.as_str(), "ACCOUNT_CONNECTED");
        let json = serde_json::to_string(&OrderEventType::PaymentPending).unwrap();
        assert_eq!(json, "\"PAYMENT_PENDING\"");
    }

    #[test]
    fn test_deserializes_from_wire_names() {
        let parsed: OrderEventType = serde_json::from_str("\"RESERVATION_FAILED\"").unwrap();
        assert_eq!(parsed, OrderEventType::ReservationFailed);
    }
}
