//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations)
//! must therefore be expressed as futures or asynchronous functions, which lets worker threads interleave requests.
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::*;

use cwo_order_engine::{
    db_types::{NewOrder, NewPayment, OrderId},
    order_objects::OrderQueryFilter,
    account_objects::UserQueryFilter,
    traits::{AccountManagement, NotificationManagement, OrderStore},
    AccountApi,
    NotificationApi,
    OrderFlowApi,
};
#[cfg(feature = "razorpay")]
use razorpay_tools::{PaymentProof, RazorpayApi};

use crate::{
    checkout::CheckoutPayload,
    data_objects::{
        JsonResponse,
        NotificationsResponse,
        OrderCreatedResponse,
        OrderDeletedResponse,
        OrderResponse,
        SocketStatus,
        StatusUpdateRequest,
    },
    errors::ServerError,
};
#[cfg(feature = "razorpay")]
use crate::data_objects::{OrderRef, PaymentDetails, PaymentInitRequest, PaymentInitResponse, PaymentVerifiedResponse};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires admin) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AdminAuthMiddlewareFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Liveness probe for the polling-based notification system.
#[get("/api/socket")]
pub async fn socket_status() -> impl Responder {
    HttpResponse::Ok()
        .json(SocketStatus { status: "Notification system active (polling-based)".to_string(), timestamp: Utc::now() })
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/api/orders/create" impl OrderStore);
/// Route handler for checkout submissions.
///
/// Validates the payload (400 naming the first offending field), allocates an order id and
/// persists the order as pending/pending. Duplicate-id races are retried internally; the
/// caller only sees a 409 once the whole retry budget is exhausted.
pub async fn create_order<B: OrderStore>(
    body: web::Json<CheckoutPayload>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order create");
    let new_order = NewOrder::try_from(body.into_inner())?;
    let order = api.place_order(new_order).await?;
    info!("💻️ Order {} created", order.order_id);
    let response =
        OrderCreatedResponse { success: true, message: "Order created successfully".to_string(), order };
    Ok(HttpResponse::Created().json(response))
}

route!(get_order => Get "/api/orders/{order_id}" impl OrderStore);
pub async fn get_order<B: OrderStore>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let oid = OrderId(path.into_inner());
    debug!("💻️ GET order {oid}");
    let order = api
        .fetch_order(&oid)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {oid} not found")))?;
    Ok(HttpResponse::Ok().json(OrderResponse { success: true, order }))
}

route!(delete_order => Delete "/api/orders/{order_id}/delete" impl OrderStore);
/// Deletes an order, unless it has been delivered (400). Deleting frees the order's daily
/// sequence number for reuse.
pub async fn delete_order<B: OrderStore>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let oid = OrderId(path.into_inner());
    debug!("💻️ DELETE order {oid}");
    let deleted = api.delete_order(&oid).await?;
    Ok(HttpResponse::Ok().json(OrderDeletedResponse {
        success: true,
        message: "Order deleted successfully".to_string(),
        deleted_order_id: deleted.order_id.0,
    }))
}

/// Query parameters of the admin order listing. Orders can be filtered on a single status
/// here; richer filtering goes through the engine's `OrderQueryFilter` directly.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct OrderListQuery {
    pub status: Option<cwo_order_engine::db_types::OrderStatusType>,
    pub payment_status: Option<cwo_order_engine::db_types::PaymentStatusType>,
    pub mobile_number: Option<String>,
    pub since: Option<chrono::DateTime<Utc>>,
    pub until: Option<chrono::DateTime<Utc>>,
}

route!(orders_index => Get "/api/orders" impl OrderStore where requires admin);
pub async fn orders_index<B: OrderStore>(
    query: web::Query<OrderListQuery>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    let mut filter = OrderQueryFilter::default();
    if let Some(status) = query.status {
        filter = filter.with_status(status);
    }
    if let Some(payment_status) = query.payment_status {
        filter = filter.with_payment_status(payment_status);
    }
    if let Some(mobile) = query.mobile_number {
        filter = filter.with_mobile_number(mobile);
    }
    filter.since = query.since;
    filter.until = query.until;
    debug!("💻️ GET orders. {filter}");
    let listing = api.order_list(filter).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "orders": listing.orders,
        "stats": listing.stats,
    })))
}

route!(update_order_status => Post "/api/orders/{order_id}/status" impl OrderStore where requires admin);
/// Admin status progression. Transitions are forward-only, payment-gated past `confirmed`,
/// and refused outright on terminal orders.
pub async fn update_order_status<B: OrderStore>(
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let oid = OrderId(path.into_inner());
    let new_status = body.into_inner().status;
    debug!("💻️ POST status {new_status} for order {oid}");
    let order = api.advance_order_status(&oid, new_status).await?;
    Ok(HttpResponse::Ok().json(OrderResponse { success: true, order }))
}

//----------------------------------------------   Notifications  ----------------------------------------------
route!(notifications => Get "/api/notifications" impl NotificationManagement);
/// Drains the pending admin notifications. This endpoint never fails the caller: any
/// backend error is logged and an empty list returned instead.
pub async fn notifications<B: NotificationManagement>(api: web::Data<NotificationApi<B>>) -> impl Responder {
    let notifications = match api.drain_all().await {
        Ok(n) => n,
        Err(e) => {
            error!("💻️ Failed to drain notifications: {e}");
            Vec::new()
        },
    };
    HttpResponse::Ok().json(NotificationsResponse { success: true, notifications })
}

//----------------------------------------------   Users  ------------------------------------------------------
/// Query parameters of the admin user listing. `status` takes `active`/`inactive`, mapping
/// onto the verification flag.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

route!(users_index => Get "/api/users" impl AccountManagement where requires admin);
pub async fn users_index<B: AccountManagement>(
    query: web::Query<UserListQuery>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    let mut filter = UserQueryFilter::default();
    if let Some(search) = query.search {
        filter = filter.with_search(search);
    }
    match query.status.as_deref() {
        Some("active") => filter = filter.with_verified(true),
        Some("inactive") => filter = filter.with_verified(false),
        _ => {},
    }
    let limit = query.limit.unwrap_or(50);
    let page = query.page.unwrap_or(1).max(1);
    filter = filter.paged(limit, (page - 1) * limit);
    debug!("💻️ GET users");
    let users = api.user_summaries(filter).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "users": users })))
}

route!(user_detail => Get "/api/users/{phone}" impl AccountManagement where requires admin);
pub async fn user_detail<B: AccountManagement>(
    path: web::Path<String>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let phone = path.into_inner();
    debug!("💻️ GET user {phone}");
    let history = api.user_history(&phone).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "user": history })))
}

route!(delete_user => Delete "/api/users/{phone}" impl AccountManagement where requires admin);
/// Deletes a user. Refused with a 400 while the user has any order history - that is a
/// permanent rejection, not something a retry can fix.
pub async fn delete_user<B: AccountManagement>(
    path: web::Path<String>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let phone = path.into_inner();
    debug!("💻️ DELETE user {phone}");
    api.delete_user(&phone).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("User deleted successfully")))
}

//----------------------------------------------   Payments  ---------------------------------------------------
#[cfg(feature = "razorpay")]
route!(create_payment_order => Post "/api/payment/create-order" impl OrderStore);
/// Creates a payment-gateway order for an existing pending order and records the link
/// between the two. The client opens the hosted checkout with the returned details.
#[cfg(feature = "razorpay")]
pub async fn create_payment_order<B: OrderStore>(
    body: web::Json<PaymentInitRequest>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<RazorpayApi>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let oid = OrderId(request.order_id);
    debug!("💻️ POST payment create-order for {oid}");
    let order = api
        .fetch_order(&oid)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {oid} not found")))?;
    if !gateway.is_configured() {
        return Err(ServerError::PaymentGatewayError("The payment gateway is not configured".to_string()));
    }
    let gateway_order = gateway
        .create_order(order.total_amount, order.order_id.as_str())
        .await
        .map_err(|e| ServerError::PaymentGatewayError(e.to_string()))?;
    api.record_gateway_order(NewPayment::new(
        order.order_id.clone(),
        gateway_order.id.clone(),
        order.total_amount,
    ))
    .await?;
    let response = PaymentInitResponse {
        success: true,
        payment: PaymentDetails {
            razorpay_order_id: gateway_order.id,
            razorpay_key_id: gateway.key_id().to_string(),
            amount: order.total_amount.value(),
            currency: gateway_order.currency,
            backend_order_id: order.order_id.as_str().to_string(),
        },
        order: OrderRef { order_id: order.order_id.0 },
    };
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(feature = "razorpay")]
route!(verify_payment => Post "/api/payment/verify" impl OrderStore);
/// Verifies the payment proof posted back by the client after the hosted checkout.
///
/// A valid signature marks the order paid (and confirmed) and fires the order-paid hooks;
/// an invalid one records the failure and returns a 400, leaving the order retryable.
#[cfg(feature = "razorpay")]
pub async fn verify_payment<B: OrderStore>(
    body: web::Json<PaymentProof>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<RazorpayApi>,
) -> Result<HttpResponse, ServerError> {
    let proof = body.into_inner();
    debug!("💻️ POST payment verify for gateway order {}", proof.razorpay_order_id);
    let payment = api
        .fetch_payment(&proof.razorpay_order_id)
        .await?
        .ok_or_else(|| {
            ServerError::NoRecordFound(format!("No payment recorded for gateway order {}", proof.razorpay_order_id))
        })?;
    if payment.order_id.as_str() != proof.backend_order_id {
        return Err(ServerError::PaymentVerificationFailed(
            "Payment proof does not match the order it claims to pay for".to_string(),
        ));
    }
    let valid = gateway.verify_proof(&proof).map_err(|e| ServerError::PaymentGatewayError(e.to_string()))?;
    if valid {
        let order = api.confirm_payment(&proof.razorpay_order_id, &proof.razorpay_payment_id).await?;
        info!("💻️ Payment for order {} verified", order.order_id);
        Ok(HttpResponse::Ok().json(PaymentVerifiedResponse {
            success: true,
            message: "Payment verified successfully".to_string(),
            order,
        }))
    } else {
        api.fail_payment(&proof.razorpay_order_id).await?;
        Err(ServerError::PaymentVerificationFailed("Invalid payment signature".to_string()))
    }
}
