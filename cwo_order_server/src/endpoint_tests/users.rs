use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use cwo_order_engine::{db_types::User, AccountApi};
use serde_json::Value;

use super::{
    helpers::{delete_request, get_request, sample_order},
    mocks::MockAccountDb,
};
use crate::routes::{DeleteUserRoute, UserDetailRoute};

fn sample_user(phone: &str) -> User {
    User {
        id: 7,
        phone_number: phone.to_string(),
        name: "Asha Verma".to_string(),
        email: "asha@example.com".to_string(),
        is_verified: true,
        addresses: vec!["221B Hosur Road".to_string()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn configure_user_with_orders(cfg: &mut ServiceConfig) {
    let mut db = MockAccountDb::new();
    db.expect_fetch_user_by_phone().returning(|phone| Ok(Some(sample_user(phone))));
    db.expect_count_orders_for_phone().returning(|_| Ok(3));
    db.expect_fetch_orders_for_phone().returning(|_| {
        Ok(vec![sample_order("CWO20250609001", cwo_order_engine::db_types::OrderStatusType::Delivered)])
    });
    let api = AccountApi::new(db);
    cfg.service(UserDetailRoute::<MockAccountDb>::new())
        .service(DeleteUserRoute::<MockAccountDb>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn users_with_orders_cannot_be_deleted_over_http() {
    let _ = env_logger::try_init().ok();
    let (status, body) = delete_request("/api/users/9876543210", configure_user_with_orders).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("3 orders"), "body was: {body}");
}

#[actix_web::test]
async fn user_detail_includes_history_and_stats() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/api/users/9876543210", configure_user_with_orders).await;
    assert_eq!(status, StatusCode::OK, "body was: {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["user"]["user"]["phoneNumber"], "9876543210");
    assert_eq!(json["user"]["orderStatistics"]["totalOrders"], 1);
    assert_eq!(json["user"]["recentOrders"][0]["orderId"], "CWO20250609001");
}

fn configure_missing_user(cfg: &mut ServiceConfig) {
    let mut db = MockAccountDb::new();
    db.expect_fetch_user_by_phone().returning(|_| Ok(None));
    let api = AccountApi::new(db);
    cfg.service(UserDetailRoute::<MockAccountDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn missing_users_return_404() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request("/api/users/9999999999", configure_missing_user).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
