//! Order state machine and workflow actions.
//!
//! The order drives both legs of the fulfillment saga. The reservation leg
//! asks a warehouse to hold stock; the payment leg connects a remote
//! payment and requests its processing. Outcome events for either leg are
//! raised into the order's log by the remote services (or by compensation)
//! and replicate independently.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{AggregateRoot, Order, OrderEventType, OrderStatus};
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

/// Collaborators the order machine's actions work through.
#[derive(Clone)]
pub struct OrderDeps {
    pub orders: Arc<dyn EntityService<Order>>,
    pub events: Arc<dyn EventLog<OrderEventType>>,
    pub remote: Arc<dyn RemoteAggregateProxy>,
}

impl OrderDeps {
    fn compensator(&self) -> Compensator<Order> {
        Compensator::new(self.orders.clone(), self.events.clone())
    }
}

/// Builds the order transition table with its actions wired in.
pub fn machine(
    deps: &OrderDeps,
) -> std::result::Result<
    MachineDefinition<OrderStatus, OrderEventType, ActionHandle<Order>>,
    DefinitionError,
> {
    use OrderEventType as Ev;
    use OrderStatus as St;

    MachineDefinition::builder(St::OrderCreated)
        .transition(
            St::OrderCreated,
            Ev::OrderCreated,
            St::OrderCreated,
            action(OrderCreated::new(deps)),
        )
        .transition(
            St::OrderCreated,
            Ev::AccountConnected,
            St::AccountConnected,
            action(AccountConnected::new(deps)),
        )
        .transition(
            St::AccountConnected,
            Ev::ReservationPending,
            St::ReservationPending,
            action(ReservationPending::new(deps)),
        )
        .transition(
            St::ReservationPending,
            Ev::ReservationSucceeded,
            St::ReservationSucceeded,
            action(ReservationSucceeded::new(deps)),
        )
        .transition(
            St::ReservationPending,
            Ev::ReservationFailed,
            St::ReservationFailed,
            action(ReservationFailed::new(deps)),
        )
        .transition(
            St::AccountConnected,
            Ev::PaymentCreated,
            St::PaymentCreated,
            action(PaymentCreated::new(deps)),
        )
        .transition(
            St::PaymentCreated,
            Ev::PaymentConnected,
            St::PaymentConnected,
            action(PaymentConnected::new(deps)),
        )
        .transition(
            St::PaymentConnected,
            Ev::PaymentPending,
            St::PaymentPending,
            action(PaymentPending::new(deps)),
        )
        .transition(
            St::PaymentPending,
            Ev::PaymentSucceeded,
            St::PaymentSucceeded,
            action(PaymentSucceeded::new(deps)),
        )
        .transition(
            St::PaymentPending,
            Ev::PaymentFailed,
            St::PaymentFailed,
            action(PaymentFailed::new(deps)),
        )
        .build()
}

/// Builds a ready-to-use replication engine for orders.
pub fn engine(deps: &OrderDeps) -> std::result::Result<ReplicationEngine<Order>, DefinitionError> {
    Ok(ReplicationEngine::new(
        machine(deps)?,
        deps.orders.clone(),
        deps.events.clone(),
    ))
}

/// Refreshes a freshly created order's status cache.
struct OrderCreated {
    orders: Arc<dyn EntityService<Order>>,
}

impl OrderCreated {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for OrderCreated {
    fn name(&self) -> &'static str {
        "order-created"
    }

    async fn execute(&self, aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for order created");
        Ok(self.orders.update(aggregate).await?)
    }
}

/// Resolves the connected account and records it on the order.
struct AccountConnected {
    orders: Arc<dyn EntityService<Order>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Order>,
}

impl AccountConnected {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for AccountConnected {
    fn name(&self) -> &'static str {
        "account-connected"
    }

    async fn execute(&self, mut aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for account connected");

        let link = require_link::<Order>(ctx.event, "account", self.name())?;
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

        let account_id =
            id_field(&body, "accountId").ok_or_else(|| ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "account representation carries no accountId".to_string(),
            })?;

        aggregate.connect_account(account_id);
        Ok(self.orders.update(aggregate).await?)
    }
}

/// Requests a stock reservation from the linked warehouse.
///
/// The warehouse raises `RESERVATION_SUCCEEDED` or `RESERVATION_FAILED`
/// into the order's log once the reservation settles; a failure of the
/// request itself compensates immediately.
struct ReservationPending {
    orders: Arc<dyn EntityService<Order>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Order>,
}

impl ReservationPending {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for ReservationPending {
    fn name(&self) -> &'static str {
        "reservation-pending"
    }

    async fn execute(&self, mut aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for reservation pending");

        if !aggregate.has_line_items() {
            return Err(ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "order has no line items to reserve".to_string(),
            });
        }

        let link = require_link::<Order>(ctx.event, "warehouse", self.name())?;
        let products: Vec<String> = aggregate
            .line_items()
            .iter()
            .map(|item| item.product_id.to_string())
            .collect();
        let params = json!({
            "orderId": aggregate.id().to_string(),
            "products": products,
        });

        match self
            .remote
            .execute(link, &["commands", "requestReservation"], params)
            .await
        {
            Ok(body) => {
                if let Some(reservation_id) = id_field(&body, "reservationId") {
                    aggregate.add_reservation(reservation_id);
                }
                Ok(self.orders.update(aggregate).await?)
            }
            Err(cause) => {
                self.compensator
                    .roll_back_and_raise(
                        aggregate,
                        ctx.previous_status,
                        OrderEventType::ReservationFailed,
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

/// Records a fulfilled reservation.
struct ReservationSucceeded {
    orders: Arc<dyn EntityService<Order>>,
}

impl ReservationSucceeded {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for ReservationSucceeded {
    fn name(&self) -> &'static str {
        "reservation-succeeded"
    }

    async fn execute(&self, aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for reservation succeeded");
        Ok(self.orders.update(aggregate).await?)
    }
}

/// Records a failed reservation.
struct ReservationFailed {
    orders: Arc<dyn EntityService<Order>>,
}

impl ReservationFailed {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for ReservationFailed {
    fn name(&self) -> &'static str {
        "reservation-failed"
    }

    async fn execute(&self, aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for reservation failed");
        Ok(self.orders.update(aggregate).await?)
    }
}

/// Connects the newly created remote payment to the order and raises the
/// connection event.
struct PaymentCreated {
    orders: Arc<dyn EntityService<Order>>,
    events: Arc<dyn EventLog<OrderEventType>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Order>,
}

impl PaymentCreated {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
            events: deps.events.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for PaymentCreated {
    fn name(&self) -> &'static str {
        "payment-created"
    }

    async fn execute(&self, mut aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for payment created");

        if aggregate.payment_id().is_some() {
            return Err(ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "payment already created".to_string(),
            });
        }

        let link = require_link::<Order>(ctx.event, "payment", self.name())?;
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

        let payment_id =
            id_field(&body, "paymentId").ok_or_else(|| ReplicationError::PreconditionViolation {
                action: self.name(),
                reason: "payment representation carries no paymentId".to_string(),
            })?;

        aggregate.connect_payment(payment_id);
        let aggregate = self.orders.update(aggregate).await?;

        // The connection drives the next leg of the payment saga.
        self.events
            .append(
                EventDraft::new(OrderEventType::PaymentConnected, aggregate.id())
                    .link("payment", link.href.clone()),
            )
            .await?;

        Ok(aggregate)
    }
}

/// Records that the payment is connected back to the order.
struct PaymentConnected {
    orders: Arc<dyn EntityService<Order>>,
}

impl PaymentConnected {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for PaymentConnected {
    fn name(&self) -> &'static str {
        "payment-connected"
    }

    async fn execute(&self, aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for payment connected");
        Ok(self.orders.update(aggregate).await?)
    }
}

/// Asks the payment service to process the connected payment.
struct PaymentPending {
    orders: Arc<dyn EntityService<Order>>,
    remote: Arc<dyn RemoteAggregateProxy>,
    compensator: Compensator<Order>,
}

impl PaymentPending {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
            remote: deps.remote.clone(),
            compensator: deps.compensator(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for PaymentPending {
    fn name(&self) -> &'static str {
        "payment-pending"
    }

    async fn execute(&self, aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for payment pending");

        let link = require_link::<Order>(ctx.event, "payment", self.name())?;
        let params = json!({ "orderId": aggregate.id().to_string() });

        match self
            .remote
            .execute(link, &["commands", "processPayment"], params)
            .await
        {
            Ok(_) => Ok(self.orders.update(aggregate).await?),
            Err(cause) => {
                self.compensator
                    .roll_back_and_raise(
                        aggregate,
                        ctx.previous_status,
                        OrderEventType::PaymentFailed,
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

/// Records a settled payment.
struct PaymentSucceeded {
    orders: Arc<dyn EntityService<Order>>,
}

impl PaymentSucceeded {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for PaymentSucceeded {
    fn name(&self) -> &'static str {
        "payment-succeeded"
    }

    async fn execute(&self, aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for payment succeeded");
        Ok(self.orders.update(aggregate).await?)
    }
}

/// Records a declined payment.
struct PaymentFailed {
    orders: Arc<dyn EntityService<Order>>,
}

impl PaymentFailed {
    fn new(deps: &OrderDeps) -> Self {
        Self {
            orders: deps.orders.clone(),
        }
    }
}

#[async_trait]
impl WorkflowAction<Order> for PaymentFailed {
    fn name(&self) -> &'static str {
        "payment-failed"
    }

    async fn execute(&self, aggregate: Order, ctx: ActionContext<'_, Order>) -> Result<Order> {
        if !ctx.is_triggering {
            return Ok(aggregate);
        }
        tracing::info!(order_id = %aggregate.id(), "executing workflow for payment failed");
        Ok(self.orders.update(aggregate).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_store::InMemoryEventLog;

    use crate::entity::InMemoryEntityService;
    use crate::remote::InMemoryRemoteProxy;

    fn deps() -> OrderDeps {
        OrderDeps {
            orders: Arc::new(InMemoryEntityService::new()),
            events: Arc::new(InMemoryEventLog::new()),
            remote: Arc::new(InMemoryRemoteProxy::new()),
        }
    }

    #[test]
    fn table_shape() {
        let machine = machine(&deps()).unwrap();
        assert_eq!(machine.initial(), OrderStatus::OrderCreated);
        assert_eq!(machine.transition_count(), 10);
    }

    #[test]
    fn both_saga_legs_branch_from_account_connected() {
        let machine = machine(&deps()).unwrap();

        let reservation = machine
            .step(OrderStatus::AccountConnected, OrderEventType::ReservationPending)
            .unwrap();
        assert_eq!(reservation.target, OrderStatus::ReservationPending);

        let payment = machine
            .step(OrderStatus::AccountConnected, OrderEventType::PaymentCreated)
            .unwrap();
        assert_eq!(payment.target, OrderStatus::PaymentCreated);
    }

    #[test]
    fn outcome_states_are_terminal() {
        let machine = machine(&deps()).unwrap();
        assert!(machine.is_terminal(OrderStatus::ReservationSucceeded));
        assert!(machine.is_terminal(OrderStatus::ReservationFailed));
        assert!(machine.is_terminal(OrderStatus::PaymentSucceeded));
        assert!(machine.is_terminal(OrderStatus::PaymentFailed));
    }
}
