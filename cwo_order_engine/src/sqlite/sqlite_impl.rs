//! `SqliteDatabase` is the concrete storage backend for the order engine.
//!
//! Unsurprisingly, it uses SQLite, and implements all the traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::db::{notifications, orders, payments, users};
use crate::{
    api::{account_objects::UserQueryFilter, order_objects::OrderQueryFilter},
    db_types::{
        GatewayPaymentStatus,
        NewNotification,
        NewOrder,
        NewPayment,
        NewUser,
        Notification,
        Order,
        OrderId,
        OrderStatusType,
        Payment,
        PaymentStatusType,
        User,
    },
    sqlite::{db_url, new_pool},
    traits::{
        AccountApiError,
        AccountManagement,
        NotificationManagement,
        OrderStore,
        OrderStoreError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, OrderStoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, OrderStoreError> {
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding schema migrations.
    pub async fn run_migrations(&self) -> Result<(), OrderStoreError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| OrderStoreError::MigrationError(e.to_string()))
    }
}

impl OrderStore for SqliteDatabase {
    async fn insert_order(&self, order_id: OrderId, order: &NewOrder) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order_id, order, &mut conn).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::order_exists(order_id, &mut conn).await?)
    }

    async fn order_ids_for_day(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderId>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::order_ids_for_day(start, end, &mut conn).await?)
    }

    async fn delete_order(&self, order_id: &OrderId) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::delete_order(order_id, &mut conn).await
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(order_id, status, &mut conn).await
    }

    async fn update_payment_status(
        &self,
        order_id: &OrderId,
        status: PaymentStatusType,
    ) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_payment_status(order_id, status, &mut conn).await
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::search_orders(query, &mut conn).await?)
    }

    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(payment, &mut conn).await
    }

    async fn fetch_payment_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(payments::fetch_payment_by_gateway_order_id(gateway_order_id, &mut conn).await?)
    }

    async fn record_payment_outcome(
        &self,
        gateway_order_id: &str,
        payment_id: Option<&str>,
        status: GatewayPaymentStatus,
    ) -> Result<Payment, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::record_payment_outcome(gateway_order_id, payment_id, status, &mut conn).await
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn enqueue_notification(&self, notification: NewNotification) -> Result<(), OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        notifications::enqueue(notification, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn drain_notifications(&self) -> Result<Vec<Notification>, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let drained = notifications::drain(&mut tx).await?;
        tx.commit().await?;
        Ok(drained)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_users(&self, query: UserQueryFilter) -> Result<Vec<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_users(query, &mut conn).await?)
    }

    async fn fetch_user_by_phone(&self, phone: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_by_phone(phone, &mut conn).await?)
    }

    async fn upsert_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::upsert_user(user, &mut conn).await?)
    }

    async fn delete_user(&self, phone: &str) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = users::delete_user(phone, &mut conn).await?;
        if deleted == 0 {
            return Err(AccountApiError::UserNotFound(phone.to_string()));
        }
        Ok(())
    }

    async fn fetch_orders_for_phone(&self, phone: &str) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_orders_for_phone(phone, &mut conn).await?)
    }

    async fn count_orders_for_phone(&self, phone: &str) -> Result<i64, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::count_orders_for_phone(phone, &mut conn).await?)
    }
}
