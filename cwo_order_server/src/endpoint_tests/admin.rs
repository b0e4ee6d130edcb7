use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use cwo_common::Secret;
use cwo_order_engine::{events::EventProducers, OrderFlowApi};
use serde_json::Value;

use super::{helpers::send_request, mocks::MockOrderDb};
use crate::{
    middleware::{AdminToken, ADMIN_TOKEN_HEADER},
    routes::OrdersIndexRoute,
};

fn configure_guarded_listing(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_search_orders().returning(|_| Ok(vec![]));
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(OrdersIndexRoute::<MockOrderDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(AdminToken(Some(Secret::new("sesame".to_string())))));
}

#[actix_web::test]
async fn the_listing_requires_the_admin_token() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(TestRequest::get().uri("/api/orders"), configure_guarded_listing).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_wrong_token_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/orders").insert_header((ADMIN_TOKEN_HEADER, "open-up"));
    let (status, _) = send_request(req, configure_guarded_listing).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn the_right_token_gets_the_listing() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/orders").insert_header((ADMIN_TOKEN_HEADER, "sesame"));
    let (status, body) = send_request(req, configure_guarded_listing).await;
    assert_eq!(status, StatusCode::OK, "body was: {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["stats"]["total"], 0);
}

fn configure_unguarded_listing(cfg: &mut ServiceConfig) {
    let mut db = MockOrderDb::new();
    db.expect_search_orders().returning(|_| Ok(vec![]));
    let api = OrderFlowApi::new(db, EventProducers::default());
    // No AdminToken registered: development mode, the guard waves everything through
    cfg.service(OrdersIndexRoute::<MockOrderDb>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn without_a_configured_token_the_guard_is_disabled() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(TestRequest::get().uri("/api/orders"), configure_unguarded_listing).await;
    assert_eq!(status, StatusCode::OK);
}
