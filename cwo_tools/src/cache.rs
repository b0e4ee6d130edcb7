//! The local pending-order cache.
//!
//! Mirrors what the storefront keeps in browser storage during checkout: the pending order
//! snapshot and the current order id. The cache makes the payment page render instantly,
//! but it is never trusted on its own - the flow always re-validates against the server.
//! It is cleared ONLY after the server confirms a successful payment.

use std::{fs, path::PathBuf};

use anyhow::{anyhow, Result};
use cwo_order_engine::db_types::Order;
use log::debug;

fn cache_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir().ok_or_else(|| anyhow!("Could not determine the cache directory"))?;
    Ok(dir.join("cwo").join("pending-order.json"))
}

/// The cached pending order, if one survives from an earlier checkout attempt.
pub fn load_pending_order() -> Option<Order> {
    let path = cache_path().ok()?;
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(order) => Some(order),
        Err(e) => {
            debug!("Discarding unreadable pending-order cache: {e}");
            None
        },
    }
}

pub fn save_pending_order(order: &Order) -> Result<()> {
    let path = cache_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, serde_json::to_string_pretty(order)?)?;
    Ok(())
}

/// Removes every trace of the finished checkout. Call only after server-confirmed success.
pub fn clear_checkout_state() {
    if let Ok(path) = cache_path() {
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!("Could not remove pending-order cache: {e}");
            }
        }
    }
}
