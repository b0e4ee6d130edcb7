use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    api::order_objects::OrderQueryFilter,
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
};

#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Order {0} already exists")]
    DuplicateOrderId(OrderId),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("No payment recorded for gateway order {0}")]
    PaymentNotFound(String),
    #[error("Could not encode order fields: {0}")]
    EncodingError(String),
    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl OrderStoreError {
    /// True for the one error the order-save loop is allowed to retry.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, OrderStoreError::DuplicateOrderId(_))
    }
}

/// The persistence contract for orders and their gateway payment records.
///
/// Writes are individually atomic but there is no cross-call transaction: the
/// check-then-insert sequence used by id allocation is inherently racy and the UNIQUE index
/// on `order_id` (surfaced as [`OrderStoreError::DuplicateOrderId`]) is the actual
/// correctness mechanism. Status updates are last-writer-wins.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Inserts a new order under the given id. A UNIQUE violation on the order id maps to
    /// [`OrderStoreError::DuplicateOrderId`] so callers can re-allocate and retry.
    async fn insert_order(&self, order_id: OrderId, order: &NewOrder) -> Result<Order, OrderStoreError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Point existence check used as the race-condition guard during id allocation.
    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, OrderStoreError>;

    /// All order ids whose `order_date` falls within `[start, end)`. The allocator parses
    /// daily sequence numbers out of these.
    async fn order_ids_for_day(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderId>, OrderStoreError>;

    /// Deletes and returns the order. Business rules (delivered orders are immortal) are
    /// enforced a level up, in the order flow API.
    async fn delete_order(&self, order_id: &OrderId) -> Result<Order, OrderStoreError>;

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Order, OrderStoreError>;

    async fn update_payment_status(
        &self,
        order_id: &OrderId,
        status: PaymentStatusType,
    ) -> Result<Order, OrderStoreError>;

    /// Fetches orders matching the filter, ordered by `order_date` ascending.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError>;

    /// Records that a gateway order was created for a storefront order.
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, OrderStoreError>;

    async fn fetch_payment_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, OrderStoreError>;

    /// Stores the outcome of a verification attempt against the payment record.
    async fn record_payment_outcome(
        &self,
        gateway_order_id: &str,
        payment_id: Option<&str>,
        status: GatewayPaymentStatus,
    ) -> Result<Payment, OrderStoreError>;
}
