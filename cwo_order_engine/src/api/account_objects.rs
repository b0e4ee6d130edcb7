use chrono::{DateTime, Utc};
use cwo_common::Rupees;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, User};

/// Filter for the admin user listing. `search` matches name, phone number or email;
/// `verified` doubles as the active/inactive status filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQueryFilter {
    pub search: Option<String>,
    pub verified: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl UserQueryFilter {
    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    pub fn paged(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Per-user order aggregates, computed over the phone-number join.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTally {
    pub total_orders: usize,
    pub total_spent: Rupees,
    pub average_order_value: Rupees,
    pub first_order_date: Option<DateTime<Utc>>,
    pub last_order_date: Option<DateTime<Utc>>,
}

impl OrderTally {
    pub fn collect(orders: &[Order]) -> Self {
        let total_orders = orders.len();
        let total_spent: Rupees = orders.iter().map(|o| o.total_amount).sum();
        let average_order_value = if total_orders > 0 {
            Rupees::from(total_spent.value() / total_orders as i64)
        } else {
            Rupees::default()
        };
        Self {
            total_orders,
            total_spent,
            average_order_value,
            first_order_date: orders.iter().map(|o| o.order_date).min(),
            last_order_date: orders.iter().map(|o| o.order_date).max(),
        }
    }
}

/// One row of the admin user listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(flatten)]
    pub user: User,
    #[serde(flatten)]
    pub tally: OrderTally,
}

/// The admin user detail view: the account, its aggregates, and recent orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHistory {
    pub user: User,
    pub order_statistics: OrderTally,
    pub recent_orders: Vec<Order>,
}
