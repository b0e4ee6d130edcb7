use crate::{
    db_types::{NewNotification, Notification},
    traits::OrderStoreError,
};

/// The queue never holds more than this many entries; older ones are dropped first.
pub const NOTIFICATION_QUEUE_CAP: usize = 50;

/// A bounded, durable queue of "new paid order" events for the admin panel's poll loop.
///
/// Delivery is at-most-once: [`drain_notifications`](Self::drain_notifications) returns the
/// whole queue and clears it in the same transaction, with no per-consumer cursors or
/// acknowledgments. A second concurrent poller sees an empty queue even if the first one
/// crashes before processing. That loss is accepted for a non-critical convenience feature.
#[allow(async_fn_in_trait)]
pub trait NotificationManagement {
    /// Appends to the queue, pruning to the newest [`NOTIFICATION_QUEUE_CAP`] entries.
    async fn enqueue_notification(&self, notification: NewNotification) -> Result<(), OrderStoreError>;

    /// Returns every queued notification and atomically clears the queue.
    async fn drain_notifications(&self) -> Result<Vec<Notification>, OrderStoreError>;
}
