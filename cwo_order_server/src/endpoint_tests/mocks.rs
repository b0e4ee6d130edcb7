use chrono::{DateTime, Utc};
use cwo_order_engine::{
    account_objects::UserQueryFilter,
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
    order_objects::OrderQueryFilter,
    traits::{AccountApiError, AccountManagement, NotificationManagement, OrderStore, OrderStoreError},
};
use mockall::mock;

mock! {
    pub OrderDb {}
    impl OrderStore for OrderDb {
        async fn insert_order(&self, order_id: OrderId, order: &NewOrder) -> Result<Order, OrderStoreError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;
        async fn order_exists(&self, order_id: &OrderId) -> Result<bool, OrderStoreError>;
        async fn order_ids_for_day(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<OrderId>, OrderStoreError>;
        async fn delete_order(&self, order_id: &OrderId) -> Result<Order, OrderStoreError>;
        async fn update_order_status(&self, order_id: &OrderId, status: OrderStatusType) -> Result<Order, OrderStoreError>;
        async fn update_payment_status(&self, order_id: &OrderId, status: PaymentStatusType) -> Result<Order, OrderStoreError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError>;
        async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, OrderStoreError>;
        async fn fetch_payment_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Payment>, OrderStoreError>;
        async fn record_payment_outcome<'a>(&self, gateway_order_id: &str, payment_id: Option<&'a str>, status: GatewayPaymentStatus) -> Result<Payment, OrderStoreError>;
    }
}

mock! {
    pub NotificationDb {}
    impl NotificationManagement for NotificationDb {
        async fn enqueue_notification(&self, notification: NewNotification) -> Result<(), OrderStoreError>;
        async fn drain_notifications(&self) -> Result<Vec<Notification>, OrderStoreError>;
    }
}

mock! {
    pub AccountDb {}
    impl AccountManagement for AccountDb {
        async fn fetch_users(&self, query: UserQueryFilter) -> Result<Vec<User>, AccountApiError>;
        async fn fetch_user_by_phone(&self, phone: &str) -> Result<Option<User>, AccountApiError>;
        async fn upsert_user(&self, user: NewUser) -> Result<User, AccountApiError>;
        async fn delete_user(&self, phone: &str) -> Result<(), AccountApiError>;
        async fn fetch_orders_for_phone(&self, phone: &str) -> Result<Vec<Order>, AccountApiError>;
        async fn count_orders_for_phone(&self, phone: &str) -> Result<i64, AccountApiError>;
    }
}
