//! Declarative finite-state machine definitions.
//!
//! A [`MachineDefinition`] is a per-domain table of
//! `(source state, event type) -> (target state, action)` built once at
//! startup and shared read-only. A [`Machine`] is the ephemeral instance
//! the replication engine creates for a single replay and discards
//! immediately after; it carries no identity and is never shared across
//! concurrent replications.
//!
//! This crate is pure: no I/O, no async. Side effects live entirely in the
//! workflow actions the table's transitions point at, which are opaque
//! handles (`A`) from this crate's point of view.

pub mod definition;
pub mod error;
pub mod machine;

pub use definition::{DefinitionBuilder, MachineDefinition, Transition};
pub use error::DefinitionError;
pub use machine::{Machine, Step};
