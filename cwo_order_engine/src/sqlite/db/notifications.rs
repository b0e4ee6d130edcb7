use sqlx::{Sqlite, Transaction};

use crate::{
    db_types::{NewNotification, Notification},
    traits::{OrderStoreError, NOTIFICATION_QUEUE_CAP},
};

/// Appends a notification and prunes the queue to its cap, oldest first, in the caller's
/// transaction.
pub async fn enqueue(
    notification: NewNotification,
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<(), OrderStoreError> {
    sqlx::query(
        "INSERT INTO notifications (order_id, customer_name, total_amount, created_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(notification.order_id.as_str())
    .bind(&notification.customer_name)
    .bind(notification.total_amount)
    .bind(chrono::Utc::now())
    .execute(&mut **tx)
    .await?;
    sqlx::query(
        "DELETE FROM notifications WHERE id NOT IN (SELECT id FROM notifications ORDER BY id DESC LIMIT $1)",
    )
    .bind(NOTIFICATION_QUEUE_CAP as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Returns the whole queue (oldest first) and clears it, in the caller's transaction.
/// Read-once: whoever commits first gets the batch.
pub async fn drain(tx: &mut Transaction<'_, Sqlite>) -> Result<Vec<Notification>, OrderStoreError> {
    let notifications: Vec<Notification> =
        sqlx::query_as("SELECT * FROM notifications ORDER BY id ASC").fetch_all(&mut **tx).await?;
    sqlx::query("DELETE FROM notifications").execute(&mut **tx).await?;
    Ok(notifications)
}
