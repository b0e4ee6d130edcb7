use std::time::Duration;

use anyhow::{anyhow, Result};
use cwo_order_engine::db_types::{Notification, Order};
use cwo_order_server::data_objects::{
    NotificationsResponse,
    OrderResponse,
    PaymentDetails,
    PaymentInitRequest,
    PaymentInitResponse,
    PaymentVerifiedResponse,
};
use log::debug;
use razorpay_tools::PaymentProof;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};
use url::Url;

use crate::profile::Profile;

/// Per-request timeout. Deliberately far above the storefront's observed 1-second abort,
/// which cut off perfectly healthy responses on slow networks.
pub const ORDER_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StorefrontClient {
    client: Client,
    profile: Profile,
}

impl StorefrontClient {
    pub fn new(profile: Profile) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("Cakes Wow Order Tools")
            .default_headers(headers)
            .timeout(ORDER_FETCH_TIMEOUT)
            .build()
            .expect("Failed to create reqwest client");
        StorefrontClient { client, profile }
    }

    pub fn server(&self) -> &str {
        self.profile.server.as_str()
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.profile.server.join(path).map_err(|e| anyhow!("Failed to join URL: {e}"))
    }

    pub async fn health(&self) -> Result<String> {
        let url = self.url("/health")?;
        let res = self.client.get(url).send().await?;
        Ok(res.text().await?)
    }

    /// Fetches an order by its id. A 404 is an error here; callers that can tolerate a
    /// missing order should match on the message.
    pub async fn fetch_order(&self, order_id: &str) -> Result<Order> {
        let url = self.url(&format!("/api/orders/{order_id}"))?;
        debug!("Fetching order {order_id} from {url}");
        let res = self.client.get(url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(anyhow!("Order {order_id} no longer exists on the server"));
        }
        if !res.status().is_success() {
            return Err(anyhow!("Failed to fetch order: {}", res.status()));
        }
        let body: OrderResponse = res.json().await?;
        Ok(body.order)
    }

    /// Asks the server to create a payment-gateway order for an existing pending order.
    pub async fn create_payment_order(&self, order_id: &str) -> Result<PaymentDetails> {
        let url = self.url("/api/payment/create-order")?;
        let request = PaymentInitRequest { order_id: order_id.to_string(), payment_method: Some("online".into()) };
        let res = self.client.post(url).json(&request).send().await?;
        if !res.status().is_success() {
            let reason = res.text().await.unwrap_or_default();
            return Err(anyhow!("Failed to create payment order. {reason}"));
        }
        let body: PaymentInitResponse = res.json().await?;
        Ok(body.payment)
    }

    /// Posts the payment proof for verification. Success means the server has marked the
    /// order paid; anything else leaves it retryable.
    pub async fn verify_payment(&self, proof: &PaymentProof) -> Result<Order> {
        let url = self.url("/api/payment/verify")?;
        let res = self.client.post(url).json(proof).send().await?;
        if !res.status().is_success() {
            let reason = res.text().await.unwrap_or_default();
            return Err(anyhow!("Payment verification failed. {reason}"));
        }
        let body: PaymentVerifiedResponse = res.json().await?;
        Ok(body.order)
    }

    /// Drains the admin notification queue. Read-once: running this consumes the batch.
    pub async fn drain_notifications(&self) -> Result<Vec<Notification>> {
        let url = self.url("/api/notifications")?;
        let res = self.client.get(url).send().await?;
        let body: NotificationsResponse = res.json().await?;
        Ok(body.notifications)
    }
}
