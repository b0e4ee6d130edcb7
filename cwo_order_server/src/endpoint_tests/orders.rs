use actix_web::{http::StatusCode, web, web::ServiceConfig};
use cwo_order_engine::{
    db_types::{OrderId, OrderStatusType},
    events::EventProducers,
    traits::OrderStoreError,
    OrderFlowApi,
};
use serde_json::Value;

use super::{
    helpers::{checkout_payload, delete_request, get_request, post_json, sample_order},
    mocks::MockOrderDb,
};
use crate::routes::{CreateOrderRoute, DeleteOrderRoute, GetOrderRoute};

fn configure_create_happy(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_order_ids_for_day().returning(|_, _| Ok(vec![]));
    db.expect_order_exists().returning(|_| Ok(false));
    db.expect_insert_order().returning(|oid, _| Ok(sample_order(oid.as_str(), OrderStatusType::Pending)));
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockOrderDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn creating_a_valid_order_returns_201_with_a_canonical_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("/api/orders/create", checkout_payload(), configure_create_happy).await;
    assert_eq!(status, StatusCode::CREATED, "body was: {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    let oid = json["order"]["orderId"].as_str().unwrap();
    assert_eq!(oid.len(), 14);
    assert!(oid.starts_with("CWO"));
    assert!(oid[3..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(json["order"]["status"], "pending");
    assert_eq!(json["order"]["paymentStatus"], "pending");
    assert_eq!(json["order"]["addons"][0]["quantity"], 2);
}

fn configure_create_no_db_calls(cfg: &mut ServiceConfig) {
    // Validation failures must reject before any database work happens; an unexpected call
    // panics the mock.
    let db = MockOrderDb::new();
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockOrderDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn missing_items_fail_with_the_field_name() {
    let _ = env_logger::try_init().ok();
    let mut payload = checkout_payload();
    payload.as_object_mut().unwrap().remove("items");
    let (status, body) = post_json("/api/orders/create", payload, configure_create_no_db_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("items is required"), "body was: {body}");
}

#[actix_web::test]
async fn missing_customer_sub_fields_fail_with_the_field_name() {
    let _ = env_logger::try_init().ok();
    let mut payload = checkout_payload();
    payload["customerInfo"].as_object_mut().unwrap().remove("timeSlot");
    let (status, body) = post_json("/api/orders/create", payload, configure_create_no_db_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Customer timeSlot is required"), "body was: {body}");
}

#[actix_web::test]
async fn invalid_mobile_numbers_echo_the_original_input() {
    let _ = env_logger::try_init().ok();
    let mut payload = checkout_payload();
    payload["customerInfo"]["mobileNumber"] = Value::String("+91 12345".to_string());
    let (status, body) = post_json("/api/orders/create", payload, configure_create_no_db_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Received: +91 12345"), "body was: {body}");
}

#[actix_web::test]
async fn spaced_mobile_numbers_are_normalized() {
    let _ = env_logger::try_init().ok();
    let mut payload = checkout_payload();
    payload["customerInfo"]["mobileNumber"] = Value::String("+91 98765 43210".to_string());
    let (status, body) = post_json("/api/orders/create", payload, configure_create_happy).await;
    assert_eq!(status, StatusCode::CREATED, "body was: {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order"]["customerInfo"]["mobileNumber"], "9876543210");
}

#[actix_web::test]
async fn an_empty_item_list_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut payload = checkout_payload();
    payload["items"] = Value::Array(vec![]);
    let (status, body) = post_json("/api/orders/create", payload, configure_create_no_db_calls).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("At least one item is required"), "body was: {body}");
}

fn configure_create_first_insert_collides(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_order_ids_for_day().returning(|_, _| Ok(vec![]));
    db.expect_order_exists().returning(|_| Ok(false));
    // First insert loses the race; the service must retry with a fresh id and succeed
    db.expect_insert_order().times(1).returning(|oid, _| Err(OrderStoreError::DuplicateOrderId(oid)));
    db.expect_insert_order().returning(|oid, _| Ok(sample_order(oid.as_str(), OrderStatusType::Pending)));
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(CreateOrderRoute::<MockOrderDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn a_duplicate_key_on_first_insert_is_retried_transparently() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("/api/orders/create", checkout_payload(), configure_create_first_insert_collides).await;
    assert_eq!(status, StatusCode::CREATED, "body was: {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert!(json["order"]["orderId"].as_str().unwrap().starts_with("CWO"));
}

fn configure_delete_delivered(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order_by_order_id()
        .returning(|oid| Ok(Some(sample_order(oid.as_str(), OrderStatusType::Delivered))));
    // No expect_delete_order: reaching the store's delete would panic the test
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(DeleteOrderRoute::<MockOrderDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn delivered_orders_cannot_be_deleted_over_http() {
    let _ = env_logger::try_init().ok();
    let (status, body) = delete_request("/api/orders/CWO20250609001/delete", configure_delete_delivered).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Cannot delete delivered orders"), "body was: {body}");
}

fn configure_delete_pending(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order_by_order_id()
        .returning(|oid| Ok(Some(sample_order(oid.as_str(), OrderStatusType::Pending))));
    db.expect_delete_order().returning(|oid| Ok(sample_order(oid.as_str(), OrderStatusType::Pending)));
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(DeleteOrderRoute::<MockOrderDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn pending_orders_delete_cleanly() {
    let _ = env_logger::try_init().ok();
    let (status, body) = delete_request("/api/orders/CWO20250609001/delete", configure_delete_pending).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["deletedOrderId"], "CWO20250609001");
}

fn configure_missing_order(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(DeleteOrderRoute::<MockOrderDb>::new())
        .service(GetOrderRoute::<MockOrderDb>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn missing_orders_return_404() {
    let _ = env_logger::try_init().ok();
    let (status, _) = delete_request("/api/orders/CWO20250609999/delete", configure_missing_order).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_request("/api/orders/CWO20250609999", configure_missing_order).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn fetching_an_order_returns_it() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockOrderDb::new();
        db.expect_fetch_order_by_order_id()
            .returning(|oid: &OrderId| Ok(Some(sample_order(oid.as_str(), OrderStatusType::Confirmed))));
        let api = OrderFlowApi::new(db, EventProducers::default());
        cfg.service(GetOrderRoute::<MockOrderDb>::new()).app_data(web::Data::new(api));
    }
    let (status, body) = get_request("/api/orders/CWO20250609001", configure).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order"]["orderId"], "CWO20250609001");
    assert_eq!(json["order"]["status"], "confirmed");
}
