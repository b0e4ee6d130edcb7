use actix_web::{
    body::MessageBody,
    dev::ServiceResponse,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{NaiveDate, TimeZone, Utc};
use cwo_common::Rupees;
use cwo_order_engine::db_types::{
    CustomerInfo,
    Order,
    OrderAddon,
    OrderId,
    OrderItem,
    OrderStatusType,
    PaymentStatusType,
};

/// Drives a request through a test app and returns (status, body). Errors surfaced by
/// middleware are rendered through their `ResponseError` impl, the same as in production.
pub async fn send_request(
    req: TestRequest,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res: ServiceResponse<_> = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res,
        Err(e) => {
            let res = actix_web::HttpResponse::from_error(e);
            let status = res.status();
            let body = body_string(res.into_body());
            return (status, body);
        },
    };
    let (_, res) = res.into_parts();
    let status = res.status();
    let body = body_string(res.into_body());
    (status, body)
}

fn body_string<B: MessageBody>(body: B) -> String {
    match body.try_into_bytes() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    send_request(TestRequest::get().uri(path), configure).await
}

pub async fn post_json(
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    send_request(TestRequest::post().uri(path).set_json(body), configure).await
}

pub async fn delete_request(path: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    send_request(TestRequest::delete().uri(path), configure).await
}

/// A persisted order as the mocks hand it back.
pub fn sample_order(oid: &str, status: OrderStatusType) -> Order {
    Order {
        id: 1,
        order_id: OrderId(oid.to_string()),
        items: vec![OrderItem {
            product_id: "cake-choco-02".to_string(),
            name: "Chocolate Truffle".to_string(),
            price: Rupees::from(49_900),
            quantity: 1,
            selected_weight: None,
            customization: None,
        }],
        addons: vec![OrderAddon {
            addon_id: "addon-candles".to_string(),
            name: "Number Candles".to_string(),
            price: Rupees::from(9_900),
            quantity: 2,
            image: String::new(),
        }],
        customer_info: CustomerInfo {
            full_name: "Asha Verma".to_string(),
            mobile_number: "9876543210".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            time_slot: "18:00-20:00".to_string(),
            area: "Koramangala".to_string(),
            full_address: "221B Hosur Road".to_string(),
        },
        total_amount: Rupees::from(159_600),
        subtotal: Rupees::from(149_700),
        delivery_charge: Rupees::from(9_900),
        status,
        payment_status: PaymentStatusType::Pending,
        payment_method: "online".to_string(),
        notes: String::new(),
        order_date: Utc.with_ymd_and_hms(2025, 6, 9, 10, 0, 0).unwrap(),
        estimated_delivery_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 6, 9, 10, 0, 0).unwrap(),
    }
}

/// The canonical checkout payload used across the endpoint tests.
pub fn checkout_payload() -> serde_json::Value {
    serde_json::from_str(include_str!("../test_assets/checkout.json")).unwrap()
}
