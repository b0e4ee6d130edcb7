//! Minimal Razorpay REST client for the Cakes Wow order server.
//!
//! Covers the two interactions the storefront needs: creating a gateway order
//! for a pending storefront order, and verifying the signature Razorpay
//! attaches to a completed checkout. Everything else the gateway offers is
//! out of scope.

mod api;
mod config;
mod data_objects;
mod error;
pub mod helpers;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{GatewayOrder, GatewayOrderRequest, PaymentProof};
pub use error::RazorpayApiError;
