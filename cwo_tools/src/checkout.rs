//! The interactive payment flow.
//!
//! One checkout attempt walks the states `FetchingOrder → OrderReady → GatewayOpen →
//! Verifying → Success | Failure`. A failure offers "retry" (a fresh attempt from
//! `FetchingOrder`) or "back". The locally cached order is only ever cleared after the
//! server confirms the payment; a crash or cancellation anywhere leaves it intact so the
//! next attempt can resume.

use std::time::Duration;

use anyhow::Result;
use cwo_order_engine::{db_types::Order, helpers::RetryPolicy};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use prettytable::{row, Table};
use razorpay_tools::PaymentProof;

use crate::{cache, client::StorefrontClient};

pub const PAYMENT_CANCELLED: &str = "Payment was cancelled";
const FETCH_FAILED: &str = "Unable to fetch order details. Please try again or contact support.";

/// Fetch retries back off exponentially: 2s, 4s, 8s, then give up.
pub fn fetch_retry_policy() -> RetryPolicy {
    RetryPolicy::new(4, Duration::from_secs(2)).with_factor(2)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    FetchingOrder,
    OrderReady,
    GatewayOpen,
    Verifying,
    Success,
    Failure(String),
}

impl CheckoutState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Success | CheckoutState::Failure(_))
    }

    /// Cancellations and verification failures can be retried from the top; they are not
    /// crashes.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CheckoutState::Failure(_))
    }
}

enum Outcome {
    Paid(Order),
    Failed(String),
}

pub struct CheckoutFlow {
    client: StorefrontClient,
    state: CheckoutState,
}

impl CheckoutFlow {
    pub fn new(client: StorefrontClient) -> Self {
        Self { client, state: CheckoutState::Idle }
    }

    fn enter(&mut self, state: CheckoutState) {
        debug!("Checkout state: {:?} -> {state:?}", self.state);
        if self.state.is_terminal() && !state.is_terminal() {
            debug!("Starting a fresh checkout attempt");
        }
        self.state = state;
    }

    pub async fn run(mut self, order_id: Option<String>) -> Result<()> {
        loop {
            match self.attempt(order_id.clone()).await {
                Outcome::Paid(order) => {
                    self.enter(CheckoutState::Success);
                    // Only now is the local state safe to discard
                    cache::clear_checkout_state();
                    println!("✅ Payment confirmed for order {}.", order.order_id);
                    println!("Track it at {}order-confirmation/{}", self.client.server(), order.order_id.as_str());
                    return Ok(());
                },
                Outcome::Failed(reason) => {
                    self.enter(CheckoutState::Failure(reason.clone()));
                    eprintln!("✗ {reason}");
                    if !self.state.is_recoverable() {
                        return Ok(());
                    }
                    let choice = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt("What next?")
                        .items(&["Retry payment", "Back to checkout"])
                        .default(0)
                        .interact_opt()?;
                    match choice {
                        Some(0) => continue,
                        _ => return Ok(()),
                    }
                },
            }
        }
    }

    async fn attempt(&mut self, order_id: Option<String>) -> Outcome {
        // A cached order gives us an id and an instant summary, but is never trusted as-is
        let cached = cache::load_pending_order();
        let order_id = match order_id.or_else(|| cached.as_ref().map(|o| o.order_id.as_str().to_string())) {
            Some(id) => id,
            None => return Outcome::Failed("No order id given and no pending order cached".to_string()),
        };
        if let Some(order) = &cached {
            if order.order_id.as_str() == order_id {
                println!("Resuming checkout (cached copy shown, revalidating...):");
                print_order_summary(order);
            }
        }

        self.enter(CheckoutState::FetchingOrder);
        let order = match self.fetch_with_backoff(&order_id).await {
            Some(order) => order,
            None => return Outcome::Failed(FETCH_FAILED.to_string()),
        };
        if let Err(e) = cache::save_pending_order(&order) {
            warn!("Could not cache the pending order: {e}");
        }

        self.enter(CheckoutState::OrderReady);
        print_order_summary(&order);
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Pay {} now?", order.total_amount))
            .default(true)
            .interact_opt()
            .ok()
            .flatten()
            .unwrap_or(false);
        if !proceed {
            return Outcome::Failed(PAYMENT_CANCELLED.to_string());
        }

        // Defend against stale local state: the order must still exist server-side at the
        // moment we open the gateway
        if self.client.fetch_order(&order_id).await.is_err() {
            return Outcome::Failed("Order details could not be verified. Please refresh or go back.".to_string());
        }

        self.enter(CheckoutState::GatewayOpen);
        let payment = match self.client.create_payment_order(&order_id).await {
            Ok(p) => p,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        println!("Gateway order {} created ({} paise, key {}).", payment.razorpay_order_id, payment.amount, payment.razorpay_key_id);
        println!("Complete the payment in the hosted checkout, then paste the proof below.");
        println!("(Leave blank to cancel.)");
        let payment_id: String = match Input::with_theme(&ColorfulTheme::default())
            .with_prompt("razorpay_payment_id")
            .allow_empty(true)
            .interact_text()
        {
            Ok(s) => s,
            Err(_) => return Outcome::Failed(PAYMENT_CANCELLED.to_string()),
        };
        if payment_id.trim().is_empty() {
            return Outcome::Failed(PAYMENT_CANCELLED.to_string());
        }
        let signature: String = match Input::with_theme(&ColorfulTheme::default())
            .with_prompt("razorpay_signature")
            .allow_empty(true)
            .interact_text()
        {
            Ok(s) => s,
            Err(_) => return Outcome::Failed(PAYMENT_CANCELLED.to_string()),
        };
        if signature.trim().is_empty() {
            return Outcome::Failed(PAYMENT_CANCELLED.to_string());
        }

        self.enter(CheckoutState::Verifying);
        let proof = PaymentProof {
            razorpay_payment_id: payment_id.trim().to_string(),
            razorpay_order_id: payment.razorpay_order_id.clone(),
            razorpay_signature: signature.trim().to_string(),
            backend_order_id: payment.backend_order_id.clone(),
        };
        match self.client.verify_payment(&proof).await {
            Ok(order) => Outcome::Paid(order),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }

    async fn fetch_with_backoff(&self, order_id: &str) -> Option<Order> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("static template is valid"));
        spinner.set_message(format!("Fetching order {order_id}..."));
        spinner.enable_steady_tick(Duration::from_millis(120));
        let result = fetch_retry_policy()
            .retry(|attempt| async move {
                if attempt > 0 {
                    debug!("Refetching order {order_id} (attempt {})", attempt + 1);
                }
                self.client.fetch_order(order_id).await
            }, |_| true)
            .await;
        spinner.finish_and_clear();
        result.ok()
    }
}

pub fn print_order_summary(order: &Order) {
    let mut table = Table::new();
    table.add_row(row!["Order", order.order_id.as_str()]);
    table.add_row(row!["Status", order.status]);
    table.add_row(row!["Payment", order.payment_status]);
    table.add_row(row!["Customer", order.customer_info.full_name]);
    table.add_row(row!["Mobile", order.customer_info.mobile_number]);
    table.add_row(row!["Delivery", format!("{} ({})", order.customer_info.delivery_date, order.customer_info.time_slot)]);
    for item in &order.items {
        let mut label = format!("{}x {}", item.quantity, item.name);
        if item.customization.as_ref().map(|c| c.is_photo()).unwrap_or(false) {
            label.push_str(" 📸");
        }
        table.add_row(row![label, item.price]);
    }
    for addon in &order.addons {
        table.add_row(row![format!("{}x {} (add-on)", addon.quantity, addon.name), addon.price]);
    }
    table.add_row(row!["Subtotal", order.subtotal]);
    table.add_row(row!["Delivery charge", order.delivery_charge]);
    table.add_row(row!["Total", order.total_amount]);
    table.printstd();
}
