//! Domain layer for the order platform.
//!
//! Six event-sourced aggregates: Account, Order, Payment, Inventory,
//! Reservation, and Warehouse. Each domain contributes a closed status
//! enumeration, a closed event-type enumeration, and an aggregate record.
//! The status held on an aggregate is a cache of the last completed
//! replication; the authoritative status is always derived by replaying
//! the aggregate's event log through its state machine.

pub mod account;
pub mod aggregate;
pub mod inventory;
pub mod order;
pub mod payment;
pub mod reservation;
pub mod value_objects;
pub mod warehouse;

pub use account::{Account, AccountEventType, AccountStatus};
pub use aggregate::AggregateRoot;
pub use inventory::{Inventory, InventoryEventType, InventoryStatus};
pub use order::{LineItem, Order, OrderEventType, OrderStatus};
pub use payment::{Payment, PaymentEventType, PaymentMethod, PaymentStatus};
pub use reservation::{Reservation, ReservationEventType, ReservationStatus};
pub use value_objects::{Address, Money, ProductId};
pub use warehouse::{Warehouse, WarehouseEventType, WarehouseStatus};
