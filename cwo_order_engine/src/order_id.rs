//! Daily sequential order-id allocation.
//!
//! Ids look like `CWO20250609001`: the `CWO` prefix, the day, and a 3-digit sequence that
//! restarts at 001 each day. The sequence fills gaps left by deleted orders (intentional
//! compaction), so the id of a deleted mid-day order can be reused the same day.
//!
//! Allocation is check-then-insert and therefore racy by construction. The point existence
//! check plus jittered retries keep collisions rare; the UNIQUE index on `order_id` (and the
//! save-side retry in [`crate::OrderFlowApi::place_order`]) is what actually guarantees
//! uniqueness. After the retry budget is spent the allocator degrades to a timestamp-derived
//! id rather than failing order creation.

use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use log::*;
use rand::Rng;
use regex::Regex;

use crate::{
    db_types::OrderId,
    helpers::RetryPolicy,
    traits::{OrderStore, OrderStoreError},
};

pub const ORDER_ID_PREFIX: &str = "CWO";
/// Attempt budget for the allocation loop, matching the storefront contract.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 10;
/// Upper bound of the random delay inserted between allocation attempts.
const ALLOCATION_JITTER: Duration = Duration::from_millis(100);

/// Formats the 8-digit date segment for the given day.
pub fn date_prefix(day: DateTime<Utc>) -> String {
    day.format("%Y%m%d").to_string()
}

/// Extracts the daily sequence number from an id, if it matches the canonical format for
/// the given date segment. Fallback (timestamp) ids never match and are simply skipped.
pub fn sequence_of(order_id: &OrderId, date_prefix: &str) -> Option<u32> {
    let re = Regex::new(r"^CWO(\d{8})(\d{3})$").expect("hardcoded regex is valid");
    let caps = re.captures(order_id.as_str())?;
    if &caps[1] != date_prefix {
        return None;
    }
    caps[2].parse().ok().filter(|&seq| seq > 0)
}

/// Walks the sorted existing sequences and returns the first integer ≥ 1 that is not taken.
/// Gaps are filled before the range is extended.
pub fn next_sequence(existing: &mut [u32]) -> u32 {
    existing.sort_unstable();
    let mut candidate = 1;
    for &seq in existing.iter() {
        if seq == candidate {
            candidate += 1;
        } else if seq > candidate {
            break;
        }
    }
    candidate
}

/// The non-canonical id used when every allocation attempt collided or errored:
/// `CWO<epoch-millis><3 random digits>`. Unique for all practical purposes, but not part of
/// the daily sequence.
pub fn fallback_id(now: DateTime<Utc>) -> OrderId {
    let random = rand::thread_rng().gen_range(0..1000);
    OrderId(format!("{ORDER_ID_PREFIX}{}{random:03}", now.timestamp_millis()))
}

/// Start and end of the UTC day containing `today`, as a half-open interval.
pub fn day_window(today: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = today.date_naive().and_hms_opt(0, 0, 0).expect("midnight is always valid").and_utc();
    let end = start + Days::new(1);
    (start, end)
}

#[derive(Debug, thiserror::Error)]
enum AllocationError {
    #[error("Candidate id {0} already exists")]
    Collision(OrderId),
    #[error(transparent)]
    Store(#[from] OrderStoreError),
}

/// Allocates the next free id for the day containing `today`.
///
/// Never fails: database errors and collisions are retried with jitter up to
/// [`MAX_ALLOCATION_ATTEMPTS`] times, after which the fallback id is returned.
pub async fn allocate<B: OrderStore>(db: &B, today: DateTime<Utc>) -> OrderId {
    let policy = RetryPolicy::new(MAX_ALLOCATION_ATTEMPTS, Duration::ZERO).with_jitter(ALLOCATION_JITTER);
    let result = policy
        .retry(
            |attempt| async move {
                let candidate = propose_id(db, today).await?;
                // Race-condition guard: another request may have taken the candidate
                // between the day query and here.
                if db.order_exists(&candidate).await? {
                    warn!("🆔️ Order id {candidate} already exists, retrying (attempt {})", attempt + 1);
                    return Err(AllocationError::Collision(candidate));
                }
                debug!("🆔️ Generated unique order id {candidate} (attempt {})", attempt + 1);
                Ok(candidate)
            },
            |_| true,
        )
        .await;
    result.unwrap_or_else(|e| {
        let id = fallback_id(Utc::now());
        error!("🆔️ Order id allocation budget exhausted ({e}). Falling back to timestamp id {id}");
        id
    })
}

async fn propose_id<B: OrderStore>(db: &B, today: DateTime<Utc>) -> Result<OrderId, AllocationError> {
    let (start, end) = day_window(today);
    let prefix = date_prefix(today);
    let ids = db.order_ids_for_day(start, end).await?;
    let mut sequences: Vec<u32> = ids.iter().filter_map(|id| sequence_of(id, &prefix)).collect();
    let seq = next_sequence(&mut sequences);
    Ok(OrderId(format!("{ORDER_ID_PREFIX}{prefix}{seq:03}")))
}
