use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteConnection};

use crate::{
    db_types::{GatewayPaymentStatus, NewPayment, OrderId, Payment},
    traits::OrderStoreError,
};

impl FromRow<'_, SqliteRow> for Payment {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Payment {
            id: row.try_get("id")?,
            order_id: OrderId(row.try_get("order_id")?),
            gateway_order_id: row.try_get("gateway_order_id")?,
            payment_id: row.try_get("payment_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            status: GatewayPaymentStatus::from(status),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, OrderStoreError> {
    let payment = sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, gateway_order_id, amount, currency, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(payment.order_id.as_str())
    .bind(&payment.gateway_order_id)
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(GatewayPaymentStatus::Created.to_string())
    .fetch_one(conn)
    .await?;
    Ok(payment)
}

pub async fn fetch_payment_by_gateway_order_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE gateway_order_id = $1")
        .bind(gateway_order_id)
        .fetch_optional(conn)
        .await
}

/// Records a verification outcome. The payment id is only known on success, so it is left
/// untouched when absent.
pub async fn record_payment_outcome(
    gateway_order_id: &str,
    payment_id: Option<&str>,
    status: GatewayPaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Payment, OrderStoreError> {
    sqlx::query_as(
        r#"
            UPDATE payments
            SET payment_id = COALESCE($2, payment_id), status = $3, updated_at = CURRENT_TIMESTAMP
            WHERE gateway_order_id = $1
            RETURNING *;
        "#,
    )
    .bind(gateway_order_id)
    .bind(payment_id)
    .bind(status.to_string())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| OrderStoreError::PaymentNotFound(gateway_order_id.to_string()))
}
