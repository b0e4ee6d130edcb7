use log::*;

use crate::{
    db_types::{NewNotification, Notification},
    traits::{NotificationManagement, OrderStoreError},
};

/// Thin wrapper over the notification queue backend. Exists mostly so the server has one
/// injectable handle per concern, mirroring the other engine APIs.
#[derive(Debug, Clone)]
pub struct NotificationApi<B> {
    db: B,
}

impl<B> NotificationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement
{
    pub async fn enqueue(&self, notification: NewNotification) -> Result<(), OrderStoreError> {
        debug!("📢️ New order notification stored for {}", notification.order_id);
        self.db.enqueue_notification(notification).await
    }

    /// Read-and-clear. Errors are the caller's to swallow; the HTTP layer maps them to an
    /// empty list so the admin poll never fails.
    pub async fn drain_all(&self) -> Result<Vec<Notification>, OrderStoreError> {
        let notifications = self.db.drain_notifications().await?;
        if !notifications.is_empty() {
            debug!("📢️ Drained {} pending notifications", notifications.len());
        }
        Ok(notifications)
    }
}
