//! User directory and the phone-number join to order history.

use chrono::NaiveDate;
use cwo_common::Rupees;
use cwo_order_engine::{
    db_types::{CustomerInfo, NewOrder, NewUser, OrderItem},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    AccountApi,
    AccountApiError,
    OrderFlowApi,
    SqliteDatabase,
};

async fn setup() -> (AccountApi<SqliteDatabase>, OrderFlowApi<SqliteDatabase>) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    (AccountApi::new(db.clone()), OrderFlowApi::new(db, EventProducers::default()))
}

fn user(phone: &str) -> NewUser {
    NewUser {
        phone_number: phone.to_string(),
        name: "Asha Verma".to_string(),
        email: "asha@example.com".to_string(),
        is_verified: true,
        addresses: vec!["221B Hosur Road".to_string()],
    }
}

fn order_for(phone: &str, rupees: i64) -> NewOrder {
    let items = vec![OrderItem {
        product_id: "cake-red-04".to_string(),
        name: "Red Velvet".to_string(),
        price: Rupees::from_rupees(rupees),
        quantity: 1,
        selected_weight: None,
        customization: None,
    }];
    let customer = CustomerInfo {
        full_name: "Asha Verma".to_string(),
        mobile_number: phone.to_string(),
        delivery_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        time_slot: "18:00-20:00".to_string(),
        area: "Koramangala".to_string(),
        full_address: "221B Hosur Road".to_string(),
    };
    NewOrder::new(items, customer, Rupees::from_rupees(rupees))
}

#[tokio::test]
async fn users_with_order_history_cannot_be_deleted() {
    let (accounts, orders) = setup().await;
    accounts.upsert_user(user("9876543210")).await.expect("Error creating user");
    orders.place_order(order_for("9876543210", 750)).await.expect("Error placing order");
    let err = accounts.delete_user("9876543210").await.expect_err("Expected deletion to be refused");
    assert!(matches!(err, AccountApiError::UserHasOrders { count: 1, .. }));
}

#[tokio::test]
async fn users_without_orders_can_be_deleted() {
    let (accounts, _orders) = setup().await;
    accounts.upsert_user(user("9876543210")).await.expect("Error creating user");
    accounts.delete_user("9876543210").await.expect("Error deleting user");
    let err = accounts.delete_user("9876543210").await.expect_err("Expected missing user");
    assert!(matches!(err, AccountApiError::UserNotFound(_)));
}

#[tokio::test]
async fn user_history_joins_orders_on_phone_number() {
    let (accounts, orders) = setup().await;
    accounts.upsert_user(user("9876543210")).await.expect("Error creating user");
    orders.place_order(order_for("9876543210", 500)).await.expect("Error placing order");
    orders.place_order(order_for("9876543210", 700)).await.expect("Error placing order");
    orders.place_order(order_for("9123456780", 900)).await.expect("Error placing order");
    let history = accounts.user_history("9876543210").await.expect("Error fetching history");
    assert_eq!(history.order_statistics.total_orders, 2);
    assert_eq!(history.order_statistics.total_spent, Rupees::from_rupees(1200));
    assert_eq!(history.order_statistics.average_order_value, Rupees::from_rupees(600));
    assert_eq!(history.recent_orders.len(), 2);
}

#[tokio::test]
async fn upserts_refresh_rather_than_duplicate() {
    let (accounts, _orders) = setup().await;
    accounts.upsert_user(user("9876543210")).await.expect("Error creating user");
    let mut updated = user("9876543210");
    updated.name = "Asha V".to_string();
    accounts.upsert_user(updated).await.expect("Error updating user");
    let history = accounts.user_history("9876543210").await.expect("Error fetching history");
    assert_eq!(history.user.name, "Asha V");
}
