//! Account aggregate, statuses, and event types.

use common::AggregateId;
use event_store::EventKind;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRoot;

/// The lifecycle status of an account.
///
/// State transitions:
/// ```text
/// Created ──► Pending ──► Confirmed ──► Active ──┬──► Suspended ──┐
///                                          ▲     └──► Archived ──┤
///                                          └─────────────────────┘
/// ```
/// Suspension and archival are both reversible through activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account record exists but its creation event has not replayed yet.
    #[default]
    AccountCreated,

    /// Awaiting confirmation of the account holder's email.
    AccountPending,

    /// Confirmed, awaiting activation.
    AccountConfirmed,

    /// In good standing; orders may be placed against it.
    AccountActive,

    /// Temporarily barred from placing orders.
    AccountSuspended,

    /// Retired; reversible via activation.
    AccountArchived,
}

impl AccountStatus {
    /// Returns true if orders may be connected to the account.
    pub fn can_place_orders(&self) -> bool {
        matches!(self, AccountStatus::AccountActive)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::AccountCreated => "ACCOUNT_CREATED",
            AccountStatus::AccountPending => "ACCOUNT_PENDING",
            AccountStatus::AccountConfirmed => "ACCOUNT_CONFIRMED",
            AccountStatus::AccountActive => "ACCOUNT_ACTIVE",
            AccountStatus::AccountSuspended => "ACCOUNT_SUSPENDED",
            AccountStatus::AccountArchived => "ACCOUNT_ARCHIVED",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events recorded against an account's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountEventType {
    AccountCreated,
    AccountConfirmed,
    AccountActivated,
    AccountSuspended,
    AccountArchived,
}

impl EventKind for AccountEventType {
    fn as_str(&self) -> &'static str {
        match self {
            AccountEventType::AccountCreated => "ACCOUNT_CREATED",
            AccountEventType::AccountConfirmed => "ACCOUNT_CONFIRMED",
            AccountEventType::AccountActivated => "ACCOUNT_ACTIVATED",
            AccountEventType::AccountSuspended => "ACCOUNT_SUSPENDED",
            AccountEventType::AccountArchived => "ACCOUNT_ARCHIVED",
        }
    }
}

impl std::fmt::Display for AccountEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The account aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AggregateId,
    first_name: String,
    last_name: String,
    email: String,
    status: AccountStatus,
}

impl Account {
    /// Creates an account in its initial status.
    pub fn new(
        id: AggregateId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            status: AccountStatus::default(),
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl AggregateRoot for Account {
    type Status = AccountStatus;
    type EventType = AccountEventType;

    fn aggregate_type() -> &'static str {
        "Account"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn status(&self) -> AccountStatus {
        self.status
    }

    fn set_status(&mut self, status: AccountStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_created() {
        let account = Account::new(AggregateId::new(), "Ada", "Lovelace", "ada@example.com");
        assert_eq!(account.status(), AccountStatus::AccountCreated);
        assert_eq!(account.email(), "ada@example.com");
    }

    #[test]
    fn only_active_accounts_place_orders() {
        assert!(AccountStatus::AccountActive.can_place_orders());
        assert!(!AccountStatus::AccountSuspended.can_place_orders());
        assert!(!AccountStatus::AccountPending.can_place_orders());
    }

    #[test]
    fn event_type_names_match_wire_format() {
        assert_eq!(AccountEventType::AccountActivated.as_str(), "ACCOUNT_ACTIVATED");
        let json = serde_json::to_string(&AccountEventType::AccountSuspended).unwrap();
        assert_eq!(json, "\"ACCOUNT_SUSPENDED\"");
    }

    #[test]
    fn status_serialization_roundtrip() {
        let status = AccountStatus::AccountConfirmed;
        let json = serde_json::to_string(&status).unwrap();
        let back: AccountStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, back);
    }
}
