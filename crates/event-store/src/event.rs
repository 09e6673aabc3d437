use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{AggregateId, EventId, Link};

/// Trait implemented by each domain's closed event-type enumeration.
///
/// Event kinds are plain copyable tags: they carry no payload beyond their
/// identity, and the set of kinds for a domain is fixed at compile time.
pub trait EventKind:
    Copy
    + Eq
    + Hash
    + fmt::Debug
    + fmt::Display
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Returns the event type name as it appears in logs and wire payloads.
    fn as_str(&self) -> &'static str;
}

/// One immutable fact about an aggregate.
///
/// Events are appended to a per-aggregate log and never mutated or deleted.
/// Within one log, `created_at` induces a strict total order, with ties
/// broken by `event_id` (assigned monotonically on append).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Event<T: EventKind> {
    /// Identifier assigned by the log on append; never reused.
    pub event_id: EventId,

    /// The kind of fact this event records.
    pub event_type: T,

    /// The aggregate this event belongs to. A weak back-reference, not an
    /// ownership edge.
    pub entity_id: AggregateId,

    /// When the event was appended; drives replay ordering.
    pub created_at: DateTime<Utc>,

    /// Supplementary named links attached at creation, e.g. the location
    /// of a related remote resource.
    #[serde(default)]
    pub links: HashMap<String, Link>,
}

impl<T: EventKind> Event<T> {
    /// Returns the link with the given relation name, if attached.
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.get(rel)
    }
}

/// A not-yet-appended event.
///
/// Drafts carry everything the caller decides (type, owning aggregate,
/// annotations); the log assigns `event_id` and `created_at` on append.
/// A fixed timestamp may be supplied for deterministic test logs.
#[derive(Debug, Clone)]
pub struct EventDraft<T: EventKind> {
    pub event_type: T,
    pub entity_id: AggregateId,
    pub links: HashMap<String, Link>,
    pub created_at: Option<DateTime<Utc>>,
}

impl<T: EventKind> EventDraft<T> {
    /// Creates a draft for the given event type and owning aggregate.
    pub fn new(event_type: T, entity_id: AggregateId) -> Self {
        Self {
            event_type,
            entity_id,
            links: HashMap::new(),
            created_at: None,
        }
    }

    /// Attaches a named link.
    pub fn link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        let rel = rel.into();
        self.links.insert(rel.clone(), Link::new(rel, href));
        self
    }

    /// Pins the creation timestamp instead of using the append time.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Materializes the draft into an event with the given identity and
    /// default timestamp. Called by log implementations.
    pub fn into_event(self, event_id: EventId, now: DateTime<Utc>) -> Event<T> {
        Event {
            event_id,
            event_type: self.event_type,
            entity_id: self.entity_id,
            created_at: self.created_at.unwrap_or(now),
            links: self.links,
        }
    }
}
