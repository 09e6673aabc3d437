//! Order domain: the central aggregate of the platform.
//!
//! An order's lifecycle spans two saga legs that both start from
//! `AccountConnected`: the reservation leg (request stock from a
//! warehouse) and the payment leg (create, connect, and process a
//! payment). The status enumeration and event types mirror those legs.

mod aggregate;
mod events;
mod state;

pub use aggregate::{LineItem, Order};
pub use events::OrderEventType;
pub use state::OrderStatus;
