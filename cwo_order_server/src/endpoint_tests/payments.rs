use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use cwo_common::{Rupees, Secret};
use cwo_order_engine::{
    db_types::{GatewayPaymentStatus, OrderId, OrderStatusType, Payment, PaymentStatusType},
    events::EventProducers,
    OrderFlowApi,
};
use razorpay_tools::{helpers::payment_signature, RazorpayApi, RazorpayConfig};
use serde_json::{json, Value};

use super::{
    helpers::{post_json, sample_order},
    mocks::MockOrderDb,
};
use crate::routes::VerifyPaymentRoute;

const TEST_SECRET: &str = "rzp_test_secret";

fn test_gateway() -> RazorpayApi {
    let config = RazorpayConfig {
        key_id: "rzp_test_key".to_string(),
        key_secret: Secret::new(TEST_SECRET.to_string()),
        ..Default::default()
    };
    RazorpayApi::new(config).unwrap()
}

fn recorded_payment(gateway_order_id: &str) -> Payment {
    Payment {
        id: 1,
        order_id: OrderId("CWO20250609001".to_string()),
        gateway_order_id: gateway_order_id.to_string(),
        payment_id: None,
        amount: Rupees::from(159_600),
        currency: "INR".to_string(),
        status: GatewayPaymentStatus::Created,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn configure_verify_success(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_payment_by_gateway_order_id().returning(|gid| Ok(Some(recorded_payment(gid))));
    db.expect_record_payment_outcome().returning(|gid, pid, status| {
        let mut payment = recorded_payment(gid);
        payment.payment_id = pid.map(str::to_string);
        payment.status = status;
        Ok(payment)
    });
    db.expect_update_payment_status().returning(|oid, _| {
        let mut order = sample_order(oid.as_str(), OrderStatusType::Pending);
        order.payment_status = PaymentStatusType::Paid;
        Ok(order)
    });
    db.expect_update_order_status().returning(|oid, status| {
        let mut order = sample_order(oid.as_str(), status);
        order.payment_status = PaymentStatusType::Paid;
        Ok(order)
    });
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(VerifyPaymentRoute::<MockOrderDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_gateway()));
}

#[actix_web::test]
async fn a_valid_proof_marks_the_order_paid_and_confirmed() {
    let _ = env_logger::try_init().ok();
    let signature = payment_signature(TEST_SECRET, "order_GATEWAY123", "pay_ABC999");
    let proof = json!({
        "razorpay_payment_id": "pay_ABC999",
        "razorpay_order_id": "order_GATEWAY123",
        "razorpay_signature": signature,
        "backend_order_id": "CWO20250609001",
    });
    let (status, body) = post_json("/api/payment/verify", proof, configure_verify_success).await;
    assert_eq!(status, StatusCode::OK, "body was: {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["order"]["paymentStatus"], "paid");
    assert_eq!(json["order"]["status"], "confirmed");
}

fn configure_verify_failure(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_payment_by_gateway_order_id().returning(|gid| Ok(Some(recorded_payment(gid))));
    db.expect_record_payment_outcome().returning(|gid, pid, status| {
        let mut payment = recorded_payment(gid);
        payment.payment_id = pid.map(str::to_string);
        payment.status = status;
        Ok(payment)
    });
    db.expect_update_payment_status().returning(|oid, status| {
        let mut order = sample_order(oid.as_str(), OrderStatusType::Pending);
        order.payment_status = status;
        Ok(order)
    });
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(VerifyPaymentRoute::<MockOrderDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_gateway()));
}

#[actix_web::test]
async fn a_tampered_proof_is_rejected_and_recorded_as_failed() {
    let _ = env_logger::try_init().ok();
    let proof = json!({
        "razorpay_payment_id": "pay_ABC999",
        "razorpay_order_id": "order_GATEWAY123",
        "razorpay_signature": "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef",
        "backend_order_id": "CWO20250609001",
    });
    let (status, body) = post_json("/api/payment/verify", proof, configure_verify_failure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body was: {body}");
    assert!(body.contains("Invalid payment signature"), "body was: {body}");
}

#[actix_web::test]
async fn a_proof_for_the_wrong_order_is_rejected() {
    let _ = env_logger::try_init().ok();
    let signature = payment_signature(TEST_SECRET, "order_GATEWAY123", "pay_ABC999");
    let proof = json!({
        "razorpay_payment_id": "pay_ABC999",
        "razorpay_order_id": "order_GATEWAY123",
        "razorpay_signature": signature,
        "backend_order_id": "CWO20250609999",
    });
    let (status, body) = post_json("/api/payment/verify", proof, configure_verify_failure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("does not match"), "body was: {body}");
}

fn configure_unknown_gateway_order(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_fetch_payment_by_gateway_order_id().returning(|_| Ok(None));
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(VerifyPaymentRoute::<MockOrderDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_gateway()));
}

#[actix_web::test]
async fn an_unknown_gateway_order_returns_404() {
    let _ = env_logger::try_init().ok();
    let proof = json!({
        "razorpay_payment_id": "pay_ABC999",
        "razorpay_order_id": "order_UNKNOWN",
        "razorpay_signature": "00",
        "backend_order_id": "CWO20250609001",
    });
    let (status, _) = post_json("/api/payment/verify", proof, configure_unknown_gateway_order).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
