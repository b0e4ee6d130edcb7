//! # Cakes Wow order server
//! This crate hosts the storefront's HTTP API. It is responsible for:
//! * Accepting checkout submissions and persisting them as pending orders.
//! * Creating payment-gateway orders and verifying payment proofs.
//! * The admin surface: order listing and progression, the notification drain, and user
//!   management.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for
//! more information.
//!
//! ## Routes
//! See [routes] for the full route table. All responses are JSON and carry a `success`
//! boolean.

pub mod checkout;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
