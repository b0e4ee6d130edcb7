use thiserror::Error;

use crate::db_types::{OrderId, OrderStatusType, PaymentStatusType};

pub use crate::traits::AccountApiError;
use crate::traits::OrderStoreError;

#[derive(Debug, Error)]
pub enum OrderManagerError {
    #[error(transparent)]
    StoreError(#[from] OrderStoreError),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Could not generate a unique order id. Please try again.")]
    OrderIdConflict,
    #[error("Cannot delete delivered orders")]
    CannotDeleteDelivered(OrderId),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
    #[error("Order {order_id} has payment status {payment_status} and cannot progress past confirmed")]
    PaymentRequired { order_id: OrderId, payment_status: PaymentStatusType },
    #[error("Order {0} already has that status")]
    StatusUnchanged(OrderId),
    #[error("No payment recorded for gateway order {0}")]
    PaymentNotFound(String),
}
