use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, SqliteConnection};

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{NewOrder, Order, OrderAddon, OrderId, OrderItem, OrderStatusType, PaymentStatusType},
    traits::OrderStoreError,
};

fn json_column<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &'static str) -> Result<T, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) })
}

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let items: Vec<OrderItem> = json_column(row, "items")?;
        let addons: Vec<OrderAddon> = json_column(row, "addons")?;
        let status: String = row.try_get("status")?;
        let payment_status: String = row.try_get("payment_status")?;
        let delivery_date = row.try_get("delivery_date")?;
        Ok(Order {
            id: row.try_get("id")?,
            order_id: OrderId(row.try_get("order_id")?),
            items,
            addons,
            customer_info: crate::db_types::CustomerInfo {
                full_name: row.try_get("customer_name")?,
                mobile_number: row.try_get("mobile_number")?,
                delivery_date,
                time_slot: row.try_get("time_slot")?,
                area: row.try_get("area")?,
                full_address: row.try_get("full_address")?,
            },
            total_amount: row.try_get("total_amount")?,
            subtotal: row.try_get("subtotal")?,
            delivery_charge: row.try_get("delivery_charge")?,
            status: OrderStatusType::from(status),
            payment_status: PaymentStatusType::from(payment_status),
            payment_method: row.try_get("payment_method")?,
            notes: row.try_get("notes")?,
            order_date: row.try_get("order_date")?,
            estimated_delivery_date: delivery_date,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Inserts a new order under the given id. A UNIQUE violation on `order_id` is surfaced as
/// [`OrderStoreError::DuplicateOrderId`] so the save loop can re-allocate and retry.
pub async fn insert_order(
    order_id: OrderId,
    order: &NewOrder,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderStoreError> {
    let items = serde_json::to_string(&order.items).map_err(|e| OrderStoreError::EncodingError(e.to_string()))?;
    let addons = serde_json::to_string(&order.addons).map_err(|e| OrderStoreError::EncodingError(e.to_string()))?;
    let result = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                order_id,
                items,
                addons,
                customer_name,
                mobile_number,
                delivery_date,
                time_slot,
                area,
                full_address,
                total_amount,
                subtotal,
                delivery_charge,
                status,
                payment_status,
                payment_method,
                notes,
                order_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(items)
    .bind(addons)
    .bind(&order.customer_info.full_name)
    .bind(&order.customer_info.mobile_number)
    .bind(order.customer_info.delivery_date)
    .bind(&order.customer_info.time_slot)
    .bind(&order.customer_info.area)
    .bind(&order.customer_info.full_address)
    .bind(order.total_amount)
    .bind(order.subtotal)
    .bind(order.delivery_charge)
    .bind(OrderStatusType::Pending.to_string())
    .bind(PaymentStatusType::Pending.to_string())
    .bind(&order.payment_method)
    .bind(&order.notes)
    .bind(order.order_date)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => Ok(order),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(OrderStoreError::DuplicateOrderId(order_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await
}

/// The point existence check used by the id allocator's race guard.
pub async fn order_exists(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

/// Order ids placed within `[start, end)`, for daily sequence allocation.
pub async fn order_ids_for_day(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderId>, sqlx::Error> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT order_id FROM orders WHERE order_date >= $1 AND order_date < $2")
            .bind(start)
            .bind(end)
            .fetch_all(conn)
            .await?;
    Ok(ids.into_iter().map(OrderId).collect())
}

pub async fn delete_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    sqlx::query_as("DELETE FROM orders WHERE order_id = $1 RETURNING *")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))
}

pub async fn update_order_status(
    order_id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderStoreError> {
    sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(status.to_string())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))
}

pub async fn update_payment_status(
    order_id: &OrderId,
    status: PaymentStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderStoreError> {
    sqlx::query_as(
        "UPDATE orders SET payment_status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(status.to_string())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))
}

/// Fetches orders according to the criteria in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `order_date` in ascending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id.0);
    }
    if let Some(mobile) = query.mobile_number {
        where_clause.push("mobile_number = ");
        where_clause.push_bind_unseparated(mobile);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses =
            query.status.as_ref().unwrap().iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    if let Some(payment_status) = query.payment_status {
        where_clause.push("payment_status = ");
        where_clause.push_bind_unseparated(payment_status.to_string());
    }
    if let Some(since) = query.since {
        where_clause.push("order_date >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("order_date <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY order_date ASC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("🗃️ search_orders returned {} rows", orders.len());
    Ok(orders)
}
