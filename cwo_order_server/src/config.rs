use std::env;

use cwo_common::Secret;
use log::*;
#[cfg(feature = "razorpay")]
use razorpay_tools::RazorpayConfig;

const DEFAULT_CWO_HOST: &str = "127.0.0.1";
const DEFAULT_CWO_PORT: u16 = 8480;
const DEFAULT_NOTIFICATION_BUFFER: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret for the admin endpoints, compared against the `x-cwo-admin-token`
    /// header. When absent the guard is disabled, which is only acceptable in development.
    pub admin_token: Option<Secret<String>>,
    /// Buffer size of the in-process event channels (order-paid notifications).
    pub notification_buffer: usize,
    /// Payment gateway credentials.
    #[cfg(feature = "razorpay")]
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CWO_HOST.to_string(),
            port: DEFAULT_CWO_PORT,
            database_url: String::default(),
            admin_token: None,
            notification_buffer: DEFAULT_NOTIFICATION_BUFFER,
            #[cfg(feature = "razorpay")]
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CWO_HOST").ok().unwrap_or_else(|| DEFAULT_CWO_HOST.into());
        let port = env::var("CWO_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CWO_PORT. {e} Using the default, {DEFAULT_CWO_PORT}, \
                         instead."
                    );
                    DEFAULT_CWO_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CWO_PORT);
        let database_url = env::var("CWO_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CWO_DATABASE_URL is not set. Please set it to the URL for the order database.");
            String::default()
        });
        let admin_token = match env::var("CWO_ADMIN_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Some(Secret::new(token)),
            _ => {
                warn!(
                    "🚨️ CWO_ADMIN_TOKEN is not set. Admin endpoints are UNPROTECTED. Do not run like this in \
                     production."
                );
                None
            },
        };
        let notification_buffer = env::var("CWO_NOTIFICATION_BUFFER")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .map_err(|e| warn!("🪛️ Invalid value for CWO_NOTIFICATION_BUFFER. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_NOTIFICATION_BUFFER);
        Self {
            host,
            port,
            database_url,
            admin_token,
            notification_buffer,
            #[cfg(feature = "razorpay")]
            razorpay: RazorpayConfig::new_from_env_or_default(),
        }
    }
}
