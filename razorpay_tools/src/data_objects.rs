use serde::{Deserialize, Serialize};

/// Request body for `POST /orders` on the gateway. Amounts are in paise.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<serde_json::Value>,
}

/// The gateway's order record, as returned by `POST /orders`.
/// `id` is the value the hosted checkout widget needs (`rzp order id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub entity: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    pub created_at: i64,
}

/// The proof posted back by a client after the hosted checkout completes.
/// Field names follow the gateway's callback payload verbatim, plus our own
/// order id so the server can correlate without an extra lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
    pub backend_order_id: String,
}
