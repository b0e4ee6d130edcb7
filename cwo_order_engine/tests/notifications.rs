//! Notification queue semantics: bounded, drain-once.

use cwo_common::Rupees;
use cwo_order_engine::{
    db_types::{NewNotification, OrderId},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    NotificationApi,
    SqliteDatabase,
};

async fn setup() -> NotificationApi<SqliteDatabase> {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    NotificationApi::new(db)
}

fn notification(n: usize) -> NewNotification {
    NewNotification {
        order_id: OrderId(format!("CWO20250609{n:03}")),
        customer_name: format!("Customer {n}"),
        total_amount: Rupees::from_rupees(500),
    }
}

#[tokio::test]
async fn drain_returns_everything_once_then_nothing() {
    let api = setup().await;
    for n in 1..=3 {
        api.enqueue(notification(n)).await.expect("Error enqueuing notification");
    }
    let first = api.drain_all().await.expect("Error draining");
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].order_id.as_str(), "CWO20250609001");
    assert_eq!(first[0].customer_name, "Customer 1");
    // A second poll with no new orders in between sees an empty queue
    let second = api.drain_all().await.expect("Error draining");
    assert!(second.is_empty());
}

#[tokio::test]
async fn the_queue_drops_oldest_beyond_the_cap() {
    let api = setup().await;
    for n in 1..=55 {
        api.enqueue(notification(n)).await.expect("Error enqueuing notification");
    }
    let drained = api.drain_all().await.expect("Error draining");
    assert_eq!(drained.len(), 50);
    // Entries 1-5 were pruned; the oldest survivor is number 6
    assert_eq!(drained[0].order_id.as_str(), "CWO20250609006");
    assert_eq!(drained[49].order_id.as_str(), "CWO20250609055");
}

#[tokio::test]
async fn draining_an_empty_queue_is_not_an_error() {
    let api = setup().await;
    let drained = api.drain_all().await.expect("Error draining");
    assert!(drained.is_empty());
}
