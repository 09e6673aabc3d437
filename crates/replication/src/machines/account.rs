//! Account state machine and workflow actions.
//!
//! The account lifecycle is administrative: every step is commanded from
//! outside (confirmation, activation, suspension, archival) and the
//! workflow actions only refresh the persisted status cache. Suspension
//! and archival are reversed by the same activation event type, so the
//! table maps `ACCOUNT_ACTIVATED` from three different source states.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{Account, AccountEventType, AccountStatus, AggregateRoot};
use event_store::EventLog;
use statemachine::{DefinitionError, MachineDefinition};

use crate::action::{ActionContext, ActionHandle, WorkflowAction};
use crate::engine::ReplicationEngine;
use crate::entity::EntityService;
use crate::error::{ReplicationError, Result};

use super::action;

/// Collaborators the account machine's actions write through.
#[derive(Clone)]
pub struct AccountDeps {
    pub accounts: Arc<dyn EntityService<Account>>,
    pub events: Arc<dyn EventLog<AccountEventType>>,
}

/// Builds the account transition table with its actions wired in.
pub fn machine(
    deps: &AccountDeps,
) -> std::result::Result<
    MachineDefinition<AccountStatus, AccountEventType, ActionHandle<Account>>,
    DefinitionError,
> {
    use AccountEventType as Ev;
    use AccountStatus as St;

    MachineDefinition::builder(St::AccountCreated)
        .transition(
            St::AccountCreated,
            Ev::AccountCreated,
            St::AccountPending,
            action(CreateAccount::new(deps)),
        )
        .transition(
            St::AccountPending,
            Ev::AccountConfirmed,
            St::AccountConfirmed,
            action(ConfirmAccount::new(deps)),
        )
        .transition(
            St::AccountConfirmed,
            Ev::AccountActivated,
            St::AccountActive,
            action(ActivateAccount::new(deps)),
        )
        .transition(
            St::AccountActive,
            Ev::AccountArchived,
            St::AccountArchived,
            action(ArchiveAccount::new(deps)),
        )
        .transition(
            St::AccountActive,
            Ev::AccountSuspended,
            St::AccountSuspended,
            action(SuspendAccount::new(deps)),
        )
        .transition(
            St::AccountArchived,
            Ev::AccountActivated,
            St::AccountActive,
            action(UnarchiveAccount::new(deps)),
        )
        .transition(
            St::AccountSuspended,
            Ev::AccountActivated,
            St::AccountActive,
            action(UnsuspendAccount::new(deps)),
        )
        .build()
}

/// Builds a ready-to-use replication engine for accounts.
pub fn engine(deps: &AccountDeps) -> std::result::Result<ReplicationEngine<Account>, DefinitionError> {
    Ok(ReplicationEngine::new(
        machine(deps)?,
        deps.accounts.clone(),
        deps.events.clone(),
    ))
}

/// Moves a newly created account into the pending state.
struct CreateAccount {
    accounts: Arc<dyn EntityService<Account>>,
}

impl CreateAccount {
    fn new(deps: &AccountDeps) -> Self {
        Self {
            accounts: deps.accounts.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Account> for CreateAccount {
    fn name(&self) -> &'static str {
        "create-account"
    }

    async fn execute(&self, aggregate: Account, ctx: ActionContext<'_, Account>) -> Result<Account> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(account_id = %aggregate.id(), "executing workflow for account created");
        Ok(self.accounts.update(aggregate).await?)
    }
}

/// Confirms the account holder's contact details.
struct ConfirmAccount {
    accounts: Arc<dyn EntityService<Account>>,
}

impl ConfirmAccount {
    fn new(deps: &AccountDeps) -> Self {
        Self {
            accounts: deps.accounts.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Account> for ConfirmAccount {
    fn name(&self) -> &'static str {
        "confirm-account"
    }

    async fn execute(&self, aggregate: Account, ctx: ActionContext<'_, Account>) -> Result<Account> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }

        if aggregate.email().is_empty() {
            return Err(ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "account has no email to confirm".to_string(),
            });
        }

        tracing::info!(account_id = %aggregate.id(), "executing workflow for account confirmed");
        Ok(self.accounts.update(aggregate).await?)
    }
}

/// Puts a confirmed account into service.
struct ActivateAccount {
    accounts: Arc<dyn EntityService<Account>>,
}

impl ActivateAccount {
    fn new(deps: &AccountDeps) -> Self {
        Self {
            accounts: deps.accounts.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Account> for ActivateAccount {
    fn name(&self) -> &'static str {
        "activate-account"
    }

    async fn execute(&self, aggregate: Account, ctx: ActionContext<'_, Account>) -> Result<Account> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(account_id = %aggregate.id(), "executing workflow for account activated");
        Ok(self.accounts.update(aggregate).await?)
    }
}

/// Retires an active account.
struct ArchiveAccount {
    accounts: Arc<dyn EntityService<Account>>,
}

impl ArchiveAccount {
    fn new(deps: &AccountDeps) -> Self {
        Self {
            accounts: deps.accounts.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Account> for ArchiveAccount {
    fn name(&self) -> &'static str {
        "archive-account"
    }

    async fn execute(&self, aggregate: Account, ctx: ActionContext<'_, Account>) -> Result<Account> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(account_id = %aggregate.id(), "executing workflow for account archived");
        Ok(self.accounts.update(aggregate).await?)
    }
}

/// Bars an active account from placing orders.
struct SuspendAccount {
    accounts: Arc<dyn EntityService<Account>>,
}

impl SuspendAccount {
    fn new(deps: &AccountDeps) -> Self {
        Self {
            accounts: deps.accounts.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Account> for SuspendAccount {
    fn name(&self) -> &'static str {
        "suspend-account"
    }

    async fn execute(&self, aggregate: Account, ctx: ActionContext<'_, Account>) -> Result<Account> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(account_id = %aggregate.id(), "executing workflow for account suspended");
        Ok(self.accounts.update(aggregate).await?)
    }
}

/// Returns an archived account to service.
struct UnarchiveAccount {
    accounts: Arc<dyn EntityService<Account>>,
}

impl UnarchiveAccount {
    fn new(deps: &AccountDeps) -> Self {
        Self {
            accounts: deps.accounts.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Account> for UnarchiveAccount {
    fn name(&self) -> &'static str {
        "unarchive-account"
    }

    async fn execute(&self, aggregate: Account, ctx: ActionContext<'_, Account>) -> Result<Account> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(account_id = %aggregate.id(), "executing workflow for account unarchived");
        Ok(self.accounts.update(aggregate).await?)
    }
}

/// Lifts a suspension.
struct UnsuspendAccount {
    accounts: Arc<dyn EntityService<Account>>,
}

impl UnsuspendAccount {
    fn new(deps: &AccountDeps) -> Self {
        Self {
            accounts: deps.accounts.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Account> for UnsuspendAccount {
    fn name(&self) -> &'static str {
        "unsuspend-account"
    }

    async fn execute(&self, aggregate: Account, ctx: ActionContext<'_, Account>) -> Result<Account> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(account_id = %aggregate.id(), "executing workflow for account unsuspended");
        Ok(self.accounts.update(aggregate).await?)
    }
}
