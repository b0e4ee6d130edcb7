use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::{error, info};

use cwo_order_engine::{
    events::{EventHandlers, EventHooks, EventProducers, OrderPaidEvent},
    db_types::NewNotification,
    AccountApi,
    NotificationApi,
    OrderFlowApi,
    SqliteDatabase,
};
#[cfg(feature = "razorpay")]
use razorpay_tools::RazorpayApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::AdminToken,
    routes::{
        health,
        socket_status,
        CreateOrderRoute,
        DeleteOrderRoute,
        DeleteUserRoute,
        GetOrderRoute,
        NotificationsRoute,
        OrdersIndexRoute,
        UpdateOrderStatusRoute,
        UserDetailRoute,
        UsersIndexRoute,
    },
};
#[cfg(feature = "razorpay")]
use crate::routes::{CreatePaymentOrderRoute, VerifyPaymentRoute};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(config.notification_buffer, notification_hooks(db.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// When an order is paid, push a "new order" alert onto the admin notification queue.
/// Runs out-of-band: a queue failure is logged, never propagated into the payment flow.
pub fn notification_hooks(db: SqliteDatabase) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(move |event: OrderPaidEvent| {
        let api = NotificationApi::new(db.clone());
        Box::pin(async move {
            let notification = NewNotification::from(&event.order);
            if let Err(e) = api.enqueue(notification).await {
                error!("📬️ Could not enqueue order-paid notification for {}: {e}", event.order.order_id);
            }
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<actix_web::dev::Server, ServerError> {
    #[cfg(feature = "razorpay")]
    let gateway = RazorpayApi::new(config.razorpay.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.admin_token.is_none() {
        info!("🚨️ Admin endpoints are running without a token guard");
    }
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let notifications_api = NotificationApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let admin_token = AdminToken(config.admin_token.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cwo::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(notifications_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(admin_token))
            .service(health)
            .service(socket_status)
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrdersIndexRoute::<SqliteDatabase>::new())
            .service(GetOrderRoute::<SqliteDatabase>::new())
            .service(DeleteOrderRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(NotificationsRoute::<SqliteDatabase>::new())
            .service(UsersIndexRoute::<SqliteDatabase>::new())
            .service(UserDetailRoute::<SqliteDatabase>::new())
            .service(DeleteUserRoute::<SqliteDatabase>::new());
        #[cfg(feature = "razorpay")]
        let app = app
            .app_data(web::Data::new(gateway.clone()))
            .service(CreatePaymentOrderRoute::<SqliteDatabase>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase>::new());
        app
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
