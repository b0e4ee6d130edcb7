//! Interface contracts for order-engine storage backends.
//!
//! ## Traits
//! * [`OrderStore`] is the main contract: order persistence, the daily id-allocation
//!   queries, payment records and status updates.
//! * [`NotificationManagement`] is the bounded, drain-once admin notification queue.
//! * [`AccountManagement`] provides the user directory and the phone-number join between
//!   users and their orders.
//!
//! Backends (currently only SQLite) implement all three. The public APIs in [`crate::api`]
//! are generic over these traits, which is also what lets the server's endpoint tests run
//! against mocks.
mod account_management;
mod notification_management;
mod order_store;

pub use account_management::{AccountApiError, AccountManagement};
pub use notification_management::{NotificationManagement, NOTIFICATION_QUEUE_CAP};
pub use order_store::{OrderStore, OrderStoreError};
