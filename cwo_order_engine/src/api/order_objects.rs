use std::fmt::Display;

use chrono::{DateTime, Utc};
use cwo_common::Rupees;
use serde::{Deserialize, Serialize};

use crate::{
    api::errors::AccountApiError,
    db_types::{Order, OrderId, OrderStatusType, PaymentStatusType},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub order_id: Option<OrderId>,
    pub mobile_number: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub status: Option<Vec<OrderStatusType>>,
    pub payment_status: Option<PaymentStatusType>,
}

impl OrderQueryFilter {
    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_mobile_number(mut self, mobile_number: String) -> Self {
        self.mobile_number = Some(mobile_number);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatusType) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn since<T>(mut self, since: T) -> Result<Self, AccountApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = since.try_into().map_err(|e| AccountApiError::QueryError(e.to_string()))?;
        self.since = Some(dt);
        Ok(self)
    }

    pub fn until<T>(mut self, until: T) -> Result<Self, AccountApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = until.try_into().map_err(|e| AccountApiError::QueryError(e.to_string()))?;
        self.until = Some(dt);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() &&
            self.mobile_number.is_none() &&
            self.since.is_none() &&
            self.until.is_none() &&
            self.status.is_none() &&
            self.payment_status.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(order_id) = &self.order_id {
            write!(f, "order_id: {order_id}. ")?;
        }
        if let Some(mobile) = &self.mobile_number {
            write!(f, "mobile_number: {mobile}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        if let Some(payment_status) = &self.payment_status {
            write!(f, "payment_status: {payment_status}. ")?;
        }
        Ok(())
    }
}

//--------------------------------------      OrderStats       -------------------------------------------------------
/// Aggregates for the admin dashboard. Cancelled orders are excluded from revenue; the
/// average is over all orders, matching the storefront's reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub preparing: usize,
    pub out_for_delivery: usize,
    pub delivered: usize,
    pub cancelled: usize,
    pub total_revenue: Rupees,
    pub average_order_value: Rupees,
}

impl OrderStats {
    pub fn collect(orders: &[Order]) -> Self {
        let mut stats = OrderStats { total: orders.len(), ..Default::default() };
        for order in orders {
            match order.status {
                OrderStatusType::Pending => stats.pending += 1,
                OrderStatusType::Confirmed => stats.confirmed += 1,
                OrderStatusType::Preparing => stats.preparing += 1,
                OrderStatusType::OutForDelivery => stats.out_for_delivery += 1,
                OrderStatusType::Delivered => stats.delivered += 1,
                OrderStatusType::Cancelled => stats.cancelled += 1,
            }
            if order.status != OrderStatusType::Cancelled {
                stats.total_revenue = stats.total_revenue + order.total_amount;
            }
        }
        if stats.total > 0 {
            stats.average_order_value = Rupees::from(stats.total_revenue.value() / stats.total as i64);
        }
        stats
    }
}

/// The admin order listing: matching orders plus their aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResult {
    pub orders: Vec<Order>,
    pub stats: OrderStats,
}
