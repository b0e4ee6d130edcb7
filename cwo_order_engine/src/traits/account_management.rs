use thiserror::Error;

use crate::{
    api::account_objects::UserQueryFilter,
    db_types::{NewUser, Order, User},
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("User {phone} has {count} orders on record and cannot be deleted")]
    UserHasOrders { phone: String, count: i64 },
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The user directory, plus the join between users and their orders.
///
/// Orders are correlated with users by normalized mobile number rather than by foreign key,
/// a deliberate carry-over from the storefront's data model. If a phone number is ever
/// recycled, the histories merge.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_users(&self, query: UserQueryFilter) -> Result<Vec<User>, AccountApiError>;

    async fn fetch_user_by_phone(&self, phone: &str) -> Result<Option<User>, AccountApiError>;

    /// Creates or refreshes a user keyed on phone number. The OTP login flow upstream is the
    /// usual writer; tests use it to seed the directory.
    async fn upsert_user(&self, user: NewUser) -> Result<User, AccountApiError>;

    /// Removes the user record. The order-history guard lives in
    /// [`crate::AccountApi::delete_user`], not here.
    async fn delete_user(&self, phone: &str) -> Result<(), AccountApiError>;

    /// The user's order history, newest first.
    async fn fetch_orders_for_phone(&self, phone: &str) -> Result<Vec<Order>, AccountApiError>;

    async fn count_orders_for_phone(&self, phone: &str) -> Result<i64, AccountApiError>;
}
