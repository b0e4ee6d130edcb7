use std::fmt::Display;

use chrono::{DateTime, Utc};
use cwo_order_engine::db_types::{Notification, Order, OrderStatusType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Response to a successful order creation. The order snapshot carries the permanent image
/// URLs and normalized add-ons, so the client can render a confirmation without refetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDeletedResponse {
    pub success: bool,
    pub message: String,
    pub deleted_order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
}

/// Body of the admin status-progression call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatusType,
}

/// Body of `POST /api/payment/create-order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitRequest {
    pub order_id: String,
    pub payment_method: Option<String>,
}

/// Everything the hosted checkout widget needs to open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub razorpay_order_id: String,
    pub razorpay_key_id: String,
    /// Paise.
    pub amount: i64,
    pub currency: String,
    pub backend_order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitResponse {
    pub success: bool,
    pub payment: PaymentDetails,
    pub order: OrderRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerifiedResponse {
    pub success: bool,
    pub message: String,
    pub order: Order,
}

/// Liveness payload for the polling notification system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
