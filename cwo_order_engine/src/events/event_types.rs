use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Emitted when payment verification marks an order as paid. The order server subscribes to
/// this to enqueue the admin notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted when an order leaves the system through cancellation or deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAnnulledEvent {
    pub order: Order,
    pub status: OrderStatusType,
}

impl OrderAnnulledEvent {
    pub fn new(order: Order) -> Self {
        let status = order.status;
        Self { order, status }
    }
}

#[derive(Debug, Clone)]
pub enum EventType {
    OrderPaid(OrderPaidEvent),
    OrderAnnulled(OrderAnnulledEvent),
}
