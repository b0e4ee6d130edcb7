use std::sync::Arc;

use cwo_common::{Rupees, INR_CURRENCY_CODE};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::RazorpayConfig,
    data_objects::{GatewayOrder, GatewayOrderRequest},
    helpers::verify_payment_signature,
    PaymentProof,
    RazorpayApiError,
};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        if !self.is_configured() {
            return Err(RazorpayApiError::NotConfigured);
        }
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    /// Creates a gateway order for the given storefront order. The receipt
    /// field carries our order id so the two records stay correlated on the
    /// gateway dashboard too.
    pub async fn create_order(&self, amount: Rupees, receipt: &str) -> Result<GatewayOrder, RazorpayApiError> {
        let request = GatewayOrderRequest {
            amount: amount.value(),
            currency: INR_CURRENCY_CODE.to_string(),
            receipt: receipt.to_string(),
            notes: None,
        };
        let order: GatewayOrder = self.rest_query(Method::POST, "/orders", Some(request)).await?;
        debug!("🔌️ Gateway order {} created for receipt {receipt} ({} paise)", order.id, order.amount);
        Ok(order)
    }

    /// Checks the signature on a completed checkout. Purely local; no network
    /// round trip is involved.
    pub fn verify_proof(&self, proof: &PaymentProof) -> Result<bool, RazorpayApiError> {
        if !self.is_configured() {
            return Err(RazorpayApiError::NotConfigured);
        }
        let valid = verify_payment_signature(
            self.config.key_secret.reveal(),
            &proof.razorpay_order_id,
            &proof.razorpay_payment_id,
            &proof.razorpay_signature,
        );
        if !valid {
            warn!("🔌️ Signature mismatch for gateway order {}", proof.razorpay_order_id);
        }
        Ok(valid)
    }
}
