//! Append-only event logs for the order platform.
//!
//! Every aggregate on the platform owns an ordered log of immutable domain
//! events. The log is the source of truth for an aggregate's status: any
//! persisted status field is a cache, refreshed whenever the replication
//! engine replays the log. This crate provides:
//! - the [`Event`] record and the [`EventDraft`] used to append one
//! - the [`EventKind`] trait implemented by each domain's event-type enum
//! - the [`EventLog`] storage contract
//! - [`InMemoryEventLog`], the in-process implementation used by tests and
//!   local runs

pub mod error;
pub mod event;
pub mod log;
pub mod memory;

pub use common::{AggregateId, EventId, Link};
pub use error::{EventStoreError, Result};
pub use event::{Event, EventDraft, EventKind};
pub use log::EventLog;
pub use memory::InMemoryEventLog;
