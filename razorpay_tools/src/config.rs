use cwo_common::Secret;
use log::*;

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// The public key id, also handed to clients so the hosted checkout can identify the merchant.
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub base_url: String,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self { key_id: String::default(), key_secret: Secret::default(), base_url: DEFAULT_BASE_URL.to_string() }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("CWO_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("🔌️ CWO_RAZORPAY_KEY_ID not set. Payment creation will fail until it is configured.");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("CWO_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("🔌️ CWO_RAZORPAY_KEY_SECRET not set. Payment verification will fail until it is configured.");
            String::default()
        }));
        let base_url = std::env::var("CWO_RAZORPAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self { key_id, key_secret, base_url }
    }

    /// True when both halves of the key pair are present. Callers use this to
    /// fail the payment feature gracefully instead of issuing doomed requests.
    pub fn is_configured(&self) -> bool {
        !self.key_id.is_empty() && !self.key_secret.reveal().is_empty()
    }
}
