use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use log::*;

use crate::{
    api::{
        errors::OrderManagerError,
        order_objects::{OrderListResult, OrderQueryFilter, OrderStats},
    },
    db_types::{
        GatewayPaymentStatus,
        NewOrder,
        NewPayment,
        Order,
        OrderId,
        OrderStatusType,
        Payment,
        PaymentStatusType,
    },
    events::{EventProducers, OrderAnnulledEvent, OrderPaidEvent},
    helpers::RetryPolicy,
    order_id,
    traits::OrderStore,
};

/// Attempt budget for the save loop. Each attempt allocates a fresh id, so this is the
/// number of ids the service will burn through before giving up with a conflict.
const MAX_SAVE_ATTEMPTS: usize = 3;
const SAVE_RETRY_JITTER: Duration = Duration::from_millis(200);

/// `OrderFlowApi` is the primary API for the order lifecycle: creation (with id
/// allocation), payment reconciliation, admin status progression and deletion.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderStore
{
    /// Persists a validated checkout as a new pending order.
    ///
    /// An order id is allocated and the insert attempted; if another request claimed the id
    /// in the meantime (UNIQUE violation), a fresh id is allocated and the save retried, up
    /// to 3 attempts with a little jitter between them. Exhausting the budget returns
    /// [`OrderManagerError::OrderIdConflict`]; any other database error is fatal and not
    /// retried.
    pub async fn place_order(&self, order: NewOrder) -> Result<Order, OrderManagerError> {
        let policy = RetryPolicy::new(MAX_SAVE_ATTEMPTS, Duration::ZERO).with_jitter(SAVE_RETRY_JITTER);
        let order = &order;
        let saved = policy
            .retry(
                |attempt| async move {
                    let oid = order_id::allocate(&self.db, Utc::now()).await;
                    trace!("🔄️📦️ Attempting to save order {oid} (attempt {})", attempt + 1);
                    self.db.insert_order(oid, order).await
                },
                |e| e.is_duplicate(),
            )
            .await
            .map_err(|e| {
                if e.is_duplicate() {
                    error!("🔄️📦️ Could not save order: every allocated id collided. {e}");
                    OrderManagerError::OrderIdConflict
                } else {
                    OrderManagerError::from(e)
                }
            })?;
        debug!("🔄️📦️ Order {} saved as pending/pending", saved.order_id);
        Ok(saved)
    }

    pub async fn fetch_order(&self, oid: &OrderId) -> Result<Option<Order>, OrderManagerError> {
        Ok(self.db.fetch_order_by_order_id(oid).await?)
    }

    /// Deletes an order, provided it has not been delivered. Delivered orders are part of
    /// the permanent record and the request is rejected outright.
    pub async fn delete_order(&self, oid: &OrderId) -> Result<Order, OrderManagerError> {
        let order = self
            .db
            .fetch_order_by_order_id(oid)
            .await?
            .ok_or_else(|| OrderManagerError::OrderNotFound(oid.clone()))?;
        if order.status == OrderStatusType::Delivered {
            return Err(OrderManagerError::CannotDeleteDelivered(oid.clone()));
        }
        let deleted = self.db.delete_order(oid).await?;
        info!("🔄️🗑️ Order {oid} deleted");
        self.call_order_annulled_hook(&deleted).await;
        Ok(deleted)
    }

    /// Moves an order along the delivery progression.
    ///
    /// Only forward transitions are allowed. `cancelled` can be reached from any
    /// non-terminal state; `delivered` and `cancelled` are terminal. Progressing past
    /// `confirmed` requires the order to be paid. Transitions are read-modify-write with no
    /// concurrency token; the last writer wins.
    pub async fn advance_order_status(
        &self,
        oid: &OrderId,
        new_status: OrderStatusType,
    ) -> Result<Order, OrderManagerError> {
        let order = self
            .db
            .fetch_order_by_order_id(oid)
            .await?
            .ok_or_else(|| OrderManagerError::OrderNotFound(oid.clone()))?;
        let old_status = order.status;
        if old_status == new_status {
            return Err(OrderManagerError::StatusUnchanged(oid.clone()));
        }
        let forbidden = OrderManagerError::InvalidStatusTransition {
            order_id: oid.clone(),
            from: old_status,
            to: new_status,
        };
        if old_status.is_terminal() {
            return Err(forbidden);
        }
        if new_status != OrderStatusType::Cancelled {
            if new_status.rank() < old_status.rank() {
                return Err(forbidden);
            }
            if new_status.rank() > OrderStatusType::Confirmed.rank() &&
                order.payment_status != PaymentStatusType::Paid
            {
                return Err(OrderManagerError::PaymentRequired {
                    order_id: oid.clone(),
                    payment_status: order.payment_status,
                });
            }
        }
        let updated = self.db.update_order_status(oid, new_status).await?;
        debug!("🔄️📦️ Order {oid} moved from {old_status} to {new_status}");
        if new_status == OrderStatusType::Cancelled {
            self.call_order_annulled_hook(&updated).await;
        }
        Ok(updated)
    }

    /// Records that a gateway order was created for this order.
    pub async fn record_gateway_order(&self, payment: NewPayment) -> Result<Payment, OrderManagerError> {
        let payment = self.db.insert_payment(payment).await?;
        debug!("🔄️💰️ Gateway order {} recorded for order {}", payment.gateway_order_id, payment.order_id);
        Ok(payment)
    }

    pub async fn fetch_payment(&self, gateway_order_id: &str) -> Result<Option<Payment>, OrderManagerError> {
        Ok(self.db.fetch_payment_by_gateway_order_id(gateway_order_id).await?)
    }

    /// The success half of payment verification: marks the payment record verified, flips
    /// the order to `paid`, advances `pending → confirmed`, and notifies the order-paid
    /// hooks. Called only after the gateway signature has checked out.
    pub async fn confirm_payment(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
    ) -> Result<Order, OrderManagerError> {
        let payment = self
            .db
            .fetch_payment_by_gateway_order_id(gateway_order_id)
            .await?
            .ok_or_else(|| OrderManagerError::PaymentNotFound(gateway_order_id.to_string()))?;
        self.db.record_payment_outcome(gateway_order_id, Some(payment_id), GatewayPaymentStatus::Verified).await?;
        let order = self.db.update_payment_status(&payment.order_id, PaymentStatusType::Paid).await?;
        let order = if order.status == OrderStatusType::Pending {
            self.db.update_order_status(&payment.order_id, OrderStatusType::Confirmed).await?
        } else {
            order
        };
        info!("🔄️✅️ Payment {payment_id} verified. Order {} is paid and confirmed", order.order_id);
        self.call_order_paid_hook(&order).await;
        Ok(order)
    }

    /// The failure half of verification: the proof did not check out. The order stays
    /// pending so the customer can retry; only the payment axis records the failure.
    pub async fn fail_payment(&self, gateway_order_id: &str) -> Result<Order, OrderManagerError> {
        let payment = self
            .db
            .fetch_payment_by_gateway_order_id(gateway_order_id)
            .await?
            .ok_or_else(|| OrderManagerError::PaymentNotFound(gateway_order_id.to_string()))?;
        self.db.record_payment_outcome(gateway_order_id, None, GatewayPaymentStatus::Failed).await?;
        let order = self.db.update_payment_status(&payment.order_id, PaymentStatusType::Failed).await?;
        warn!("🔄️❌️ Payment for gateway order {gateway_order_id} failed verification");
        Ok(order)
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagerError> {
        Ok(self.db.search_orders(query).await?)
    }

    /// The admin listing: matching orders plus dashboard aggregates.
    pub async fn order_list(&self, query: OrderQueryFilter) -> Result<OrderListResult, OrderManagerError> {
        let orders = self.db.search_orders(query).await?;
        let stats = OrderStats::collect(&orders);
        Ok(OrderListResult { orders, stats })
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️📬️ Notifying order-paid hook subscribers");
            emitter.publish_event(OrderPaidEvent::new(order.clone())).await;
        }
    }

    async fn call_order_annulled_hook(&self, order: &Order) {
        for emitter in &self.producers.order_annulled_producer {
            emitter.publish_event(OrderAnnulledEvent::new(order.clone())).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
