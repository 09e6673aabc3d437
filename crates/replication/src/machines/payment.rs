//! Payment state machine and workflow actions.
//!
//! Processing is the compensation showcase of the platform: the charge is
//! attempted when the `PAYMENT_PROCESSED` event replicates, and a declined
//! charge rolls the payment back to its pre-attempt status and raises
//! `PAYMENT_FAILED` into the payment's own log.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{AggregateRoot, Payment, PaymentEventType, PaymentStatus};
use event_store::{EventDraft, EventLog};
use serde_json::json;
use statemachine::{DefinitionError, MachineDefinition};

use crate::action::{ActionContext, ActionHandle, WorkflowAction};
use crate::compensation::Compensator;
use crate::engine::ReplicationEngine;
use crate::entity::EntityService;
use crate::error::{ReplicationError, Result};
use crate::remote::RemoteAggregateProxy;

use super::{action, id_field, require_link};

/// Collaborators the payment machine's actions work through.
#[derive(Clone)]
pub struct PaymentDeps {
    pub payments: Arc<dyn EntityService<Payment>>,
    pub events: Arc<dyn EventLog<PaymentEventType>>,
    pub remote: Arc<dyn RemoteAggregateProxy>,
}

impl PaymentDeps {
    fn compensator(&self) -> Compensator<Payment> {
        Compensator::new(self.payments.clone(), self.events.clone())
    }
}

/// Builds the payment transition table with its actions wired in.
///
/// `PAYMENT_PENDING` is reachable both directly from creation and after
/// the order connection step; both rows share the same action.
pub fn machine(
    deps: &PaymentDeps,
) -> std::result::Result<
    MachineDefinition<PaymentStatus, PaymentEventType, ActionHandle<Payment>>,
    DefinitionError,
> {
    use PaymentEventType as Ev;
    use PaymentStatus as St;

    MachineDefinition::builder(St::PaymentCreated)
        .transition(
            St::PaymentCreated,
            Ev::PaymentCreated,
            St::PaymentCreated,
            action(PaymentCreated::new(deps)),
        )
        .transition(
            St::PaymentCreated,
            Ev::OrderConnected,
            St::OrderConnected,
            action(ConnectOrder::new(deps)),
        )
        .transition(
            St::PaymentCreated,
            Ev::PaymentPending,
            St::PaymentPending,
            action(PaymentPending::new(deps)),
        )
        .transition(
            St::OrderConnected,
            Ev::PaymentPending,
            St::PaymentPending,
            action(PaymentPending::new(deps)),
        )
        .transition(
            St::PaymentPending,
            Ev::PaymentProcessed,
            St::PaymentProcessed,
            action(ProcessPayment::new(deps)),
        )
        .transition(
            St::PaymentProcessed,
            Ev::PaymentSucceeded,
            St::PaymentSucceeded,
            action(PaymentSucceeded::new(deps)),
        )
        .transition(
            St::PaymentProcessed,
            Ev::PaymentFailed,
            St::PaymentFailed,
            action(PaymentFailed::new(deps)),
        )
        .build()
}

/// Builds a ready-to-use replication engine for payments.
pub fn engine(
    deps: &PaymentDeps,
) -> std::result::Result<ReplicationEngine<Payment>, DefinitionError> {
    Ok(ReplicationEngine::new(
        machine(deps)?,
        deps.payments.clone(),
        deps.events.clone(),
    ))
}

/// Validates and persists a freshly created payment.
struct PaymentCreated {
    payments: Arc<dyn EntityService<Payment>>,
}

impl PaymentCreated {
    fn new(deps: &PaymentDeps) -> Self {
        Self {
            payments: deps.payments.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Payment> for PaymentCreated {
    fn name(&self) -> &'static str {
        "payment-created"
    }

    async fn execute(&self, aggregate: Payment, ctx: ActionContext<'_, Payment>) -> Result<Payment> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(payment_id = %aggregate.id(), "executing workflow for payment created");

        if !aggregate.amount().is_positive() {
            return Err(ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: format!("payment amount must be positive, was {}", aggregate.amount()),
            });
        }

        Ok(self.payments.update(aggregate).await?)
    }
}

/// Resolves the order this payment settles and records the connection.
struct ConnectOrder {
    payments: Arc<dyn EntityService<Payment>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Payment>,
}

impl ConnectOrder {
    fn new(deps: &PaymentDeps) -> Self {
        Self {
            payments: deps.payments.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Payment> for ConnectOrder {
    fn name(&self) -> &'static str {
        "connect-order"
    }

    async fn execute(
        &self,
        mut aggregate: Payment,
        ctx: ActionContext<'_, Payment>,
    ) -> Result<Payment> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(payment_id = %aggregate.id(), "executing workflow for order connected");

        let link = require_link::<Payment>(ctx.event, "order", self.name())?;
        let body = match self.remote.follow(link, &["self"]).await {
            Ok(body) => body,
            Err(cause) => {
                self.compensator
                    .roll_back(aggregate, ctx.previous_status)
                    .await?;
                return Err(ReplicationError::RemoteStepFailure {
                    action: self.name(),
                    source: cause,
                });
            }
        };

        let order_id =
            id_field(&body, "orderId").ok_or_else(|| ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "order representation carries no orderId".to_string(),
            })?;

        aggregate.connect_order(order_id);
        Ok(self.payments.update(aggregate).await?)
    }
}

/// Marks the payment as awaiting processing.
struct PaymentPending {
    payments: Arc<dyn EntityService<Payment>>,
}

impl PaymentPending {
    fn new(deps: &PaymentDeps) -> Self {
        Self {
            payments: deps.payments.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Payment> for PaymentPending {
    fn name(&self) -> &'static str {
        "payment-pending"
    }

    async fn execute(&self, aggregate: Payment, ctx: ActionContext<'_, Payment>) -> Result<Payment> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(payment_id = %aggregate.id(), "executing workflow for payment pending");
        Ok(self.payments.update(aggregate).await?)
    }
}

/// Charges the payment through the linked processor.
///
/// On a declined or unreachable charge, restores the pre-attempt status
/// and raises `PAYMENT_FAILED`; on success, raises `PAYMENT_SUCCEEDED`.
/// The processor's charge command must itself be idempotent for
/// redelivery of the `PAYMENT_PROCESSED` event to be safe.
struct ProcessPayment {
    payments: Arc<dyn EntityService<Payment>>,
    events: Arc<dyn EventLog<PaymentEventType>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Payment>,
}

impl ProcessPayment {
    fn new(deps: &PaymentDeps) -> Self {
        Self {
            payments: deps.payments.clone(),
            events: deps.events.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Payment> for ProcessPayment {
    fn name(&self) -> &'static str {
        "process-payment"
    }

    async fn execute(&self, aggregate: Payment, ctx: ActionContext<'_, Payment>) -> Result<Payment> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(
            payment_id = %aggregate.id(),
            amount = %aggregate.amount(),
            "executing workflow for payment processed"
        );

        if !aggregate.amount().is_positive() {
            return Err(ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "cannot charge a non-positive amount".to_string(),
            });
        }

        let link = require_link::<Payment>(ctx.event, "processor", self.name())?;
        let params = json!({
            "paymentId": aggregate.id().to_string(),
            "amount": aggregate.amount().cents(),
        });

        match self.remote.execute(link, &["commands", "charge"], params).await {
            Ok(_) => {
                let aggregate = self.payments.update(aggregate).await?;
                self.events
                    .append(EventDraft::new(
                        PaymentEventType::PaymentSucceeded,
                        aggregate.id(),
                    ))
                    .await?;
                Ok(aggregate)
            }
            Err(cause) => {
                self.compensator
                    .roll_back_and_raise(
                        aggregate,
                        ctx.previous_status,
                        PaymentEventType::PaymentFailed,
                    )
                    .await?;
                Err(ReplicationError::RemoteStepFailure {
                    action: self.name(),
                    source: cause,
                })
            }
        }
    }
}

/// Records the settled charge and notifies the connected order.
struct PaymentSucceeded {
    payments: Arc<dyn EntityService<Payment>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Payment>,
}

impl PaymentSucceeded {
    fn new(deps: &PaymentDeps) -> Self {
        Self {
            payments: deps.payments.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Payment> for PaymentSucceeded {
    fn name(&self) -> &'static str {
        "payment-succeeded"
    }

    async fn execute(&self, aggregate: Payment, ctx: ActionContext<'_, Payment>) -> Result<Payment> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(payment_id = %aggregate.id(), "executing workflow for payment succeeded");

        // Orders connected through a link hear about the outcome; payments
        // processed standalone just settle.
        if let Some(link) = ctx.event.link("order") {
            let params = json!({ "paymentId": aggregate.id().to_string() });
            if let Err(cause) = self
                .remote
                .execute(link, &["commands", "completeOrder"], params)
                .await
            {
                self.compensator
                    .roll_back(aggregate, ctx.previous_status)
                    .await?;
                return Err(ReplicationError::RemoteStepFailure {
                    action: self.name(),
                    source: cause,
                });
            }
        }

        Ok(self.payments.update(aggregate).await?)
    }
}

/// Records the declined charge.
struct PaymentFailed {
    payments: Arc<dyn EntityService<Payment>>,
}

impl PaymentFailed {
    fn new(deps: &PaymentDeps) -> Self {
        Self {
            payments: deps.payments.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Payment> for PaymentFailed {
    fn name(&self) -> &'static str {
        "payment-failed"
    }

    async fn execute(&self, aggregate: Payment, ctx: ActionContext<'_, Payment>) -> Result<Payment> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(payment_id = %aggregate.id(), "executing workflow for payment failed");
        Ok(self.payments.update(aggregate).await?)
    }
}
