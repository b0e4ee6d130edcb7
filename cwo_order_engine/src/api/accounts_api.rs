use log::*;

use crate::{
    api::account_objects::{OrderTally, UserHistory, UserQueryFilter, UserSummary},
    db_types::{NewUser, User},
    traits::{AccountApiError, AccountManagement},
};

/// Number of recent orders included in the admin user-detail view.
const RECENT_ORDER_LIMIT: usize = 10;

/// Query API over the user directory and each user's order history.
#[derive(Debug, Clone)]
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    /// The admin listing: each user with their order aggregates attached.
    pub async fn user_summaries(&self, query: UserQueryFilter) -> Result<Vec<UserSummary>, AccountApiError> {
        let users = self.db.fetch_users(query).await?;
        let mut summaries = Vec::with_capacity(users.len());
        for user in users {
            let orders = self.db.fetch_orders_for_phone(&user.phone_number).await?;
            summaries.push(UserSummary { tally: OrderTally::collect(&orders), user });
        }
        Ok(summaries)
    }

    pub async fn user_history(&self, phone: &str) -> Result<UserHistory, AccountApiError> {
        let user = self
            .db
            .fetch_user_by_phone(phone)
            .await?
            .ok_or_else(|| AccountApiError::UserNotFound(phone.to_string()))?;
        let mut orders = self.db.fetch_orders_for_phone(phone).await?;
        let order_statistics = OrderTally::collect(&orders);
        orders.truncate(RECENT_ORDER_LIMIT);
        Ok(UserHistory { user, order_statistics, recent_orders: orders })
    }

    pub async fn upsert_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        self.db.upsert_user(user).await
    }

    /// Deletes a user, refused while any order history exists. This is a permanent
    /// business-rule rejection, not a retryable failure.
    pub async fn delete_user(&self, phone: &str) -> Result<(), AccountApiError> {
        let user = self
            .db
            .fetch_user_by_phone(phone)
            .await?
            .ok_or_else(|| AccountApiError::UserNotFound(phone.to_string()))?;
        let count = self.db.count_orders_for_phone(&user.phone_number).await?;
        if count > 0 {
            return Err(AccountApiError::UserHasOrders { phone: phone.to_string(), count });
        }
        self.db.delete_user(phone).await?;
        info!("👤️ User {phone} deleted");
        Ok(())
    }
}
