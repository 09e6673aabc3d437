//! Per-domain state machine wiring and workflow action library.
//!
//! Each submodule owns one domain: its transition table (built once at
//! startup via `machine`) and the workflow actions attached to the table's
//! transitions, constructed from an explicit dependency struct. One action
//! exists per transition; persist-only actions refresh the status cache,
//! remote-step actions additionally carry a downstream call and its
//! compensation.

pub mod account;
pub mod inventory;
pub mod order;
pub mod payment;
pub mod reservation;
pub mod warehouse;

use common::AggregateId;
use domain::AggregateRoot;
use event_store::Event;
use uuid::Uuid;

use crate::action::{ActionHandle, WorkflowAction};
use crate::error::ReplicationError;

/// Wraps a constructed action into the handle stored in transition tables.
pub(crate) fn action<A, W>(workflow: W) -> ActionHandle<A>
where
    A: AggregateRoot,
    W: WorkflowAction<A> + 'static,
{
    std::sync::Arc::new(workflow)
}

/// Extracts an aggregate identity from a field of a remote representation.
pub(crate) fn id_field(body: &serde_json::Value, field: &str) -> Option<AggregateId> {
    body.get(field)?
        .as_str()?
        .parse::<Uuid>()
        .ok()
        .map(AggregateId::from_uuid)
}

/// Returns the event's link for `rel`, or a precondition violation naming
/// the action that needed it.
pub(crate) fn require_link<'a, A: AggregateRoot>(
    event: &'a Event<A::EventType>,
    rel: &str,
    action: &'static str,
) -> Result<&'a common::Link, ReplicationError> {
    event
        .link(rel)
        .ok_or_else(|| ReplicationError::PreconditionViolation {
            action,
            reason: format!("event carries no '{rel}' link"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_field_parses_uuid_strings() {
        let id = AggregateId::new();
        let body = json!({ "orderId": id.to_string() });
        assert_eq!(id_field(&body, "orderId"), Some(id));
    }

    #[test]
    fn id_field_rejects_missing_or_malformed() {
        assert_eq!(id_field(&json!({}), "orderId"), None);
        assert_eq!(id_field(&json!({"orderId": 7}), "orderId"), None);
        assert_eq!(id_field(&json!({"orderId": "nope"}), "orderId"), None);
    }
}
