//! Cakes Wow Order Engine
//!
//! The order engine holds the core logic of the storefront's order lifecycle: order-id
//! allocation, order creation and deletion, payment reconciliation, the admin notification
//! queue and the user directory. It is HTTP-framework agnostic; the order server wraps it.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the only supported backend
//!    at present. You should never need to access the database directly; use the public APIs
//!    instead. The exception is the data types stored in the database, which are defined in
//!    [`mod@db_types`] and are public.
//! 2. The public API ([`mod@api`]). Backends implement the traits in [`mod@traits`] to
//!    provide storage for the APIs.
//!
//! The engine also emits events when certain actions occur, most importantly when an order is
//! marked as paid. A simple actor framework lets you hook into these events and perform
//! custom actions (the order server uses it to enqueue admin notifications).
mod api;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod order_id;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{
    account_objects,
    accounts_api::AccountApi,
    errors::{AccountApiError, OrderManagerError},
    notifications_api::NotificationApi,
    order_flow_api::OrderFlowApi,
    order_objects,
};
