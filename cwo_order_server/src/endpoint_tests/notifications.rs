use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{body::MessageBody, test, test::TestRequest, web, App};
use chrono::Utc;
use cwo_common::Rupees;
use cwo_order_engine::{
    db_types::{Notification, OrderId},
    traits::OrderStoreError,
    NotificationApi,
};
use serde_json::Value;

use super::{helpers::get_request, mocks::MockNotificationDb};
use crate::routes::NotificationsRoute;

fn pending_batch() -> Vec<Notification> {
    vec![
        Notification {
            id: 1,
            order_id: OrderId("CWO20250609001".to_string()),
            customer_name: "Asha Verma".to_string(),
            total_amount: Rupees::from(159_600),
            created_at: Utc::now(),
        },
        Notification {
            id: 2,
            order_id: OrderId("CWO20250609002".to_string()),
            customer_name: "Rohan Mehta".to_string(),
            total_amount: Rupees::from(49_900),
            created_at: Utc::now(),
        },
    ]
}

/// Drain-once semantics at the HTTP level: the same app instance is polled twice, so the
/// second call sees the queue the first one cleared.
#[actix_web::test]
async fn the_first_poll_gets_the_batch_and_the_second_gets_nothing() {
    let _ = env_logger::try_init().ok();
    let mut db = MockNotificationDb::new();
    let drained = AtomicBool::new(false);
    db.expect_drain_notifications().returning(move || {
        if drained.swap(true, Ordering::SeqCst) {
            Ok(vec![])
        } else {
            Ok(pending_batch())
        }
    });
    let api = NotificationApi::new(db);
    let app = App::new()
        .service(NotificationsRoute::<MockNotificationDb>::new())
        .app_data(web::Data::new(api));
    let service = test::init_service(app).await;

    let res = test::call_service(&service, TestRequest::get().uri("/api/notifications").to_request()).await;
    assert!(res.status().is_success());
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["notifications"].as_array().unwrap().len(), 2);
    assert_eq!(json["notifications"][0]["orderId"], "CWO20250609001");
    assert_eq!(json["notifications"][0]["customerName"], "Asha Verma");

    let res = test::call_service(&service, TestRequest::get().uri("/api/notifications").to_request()).await;
    assert!(res.status().is_success());
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["notifications"].as_array().unwrap().len(), 0);
}

fn configure_drain_errors(cfg: &mut actix_web::web::ServiceConfig) {
    let mut db = MockNotificationDb::new();
    db.expect_drain_notifications()
        .returning(|| Err(OrderStoreError::EncodingError("simulated backend failure".to_string())));
    let api = NotificationApi::new(db);
    cfg.service(NotificationsRoute::<MockNotificationDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn backend_failures_never_fail_the_poller() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/api/notifications", configure_drain_errors).await;
    assert!(status.is_success());
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["notifications"].as_array().unwrap().len(), 0);
}
