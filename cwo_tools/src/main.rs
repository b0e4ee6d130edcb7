//! `cwo` - operator tooling for the Cakes Wow order server.
//!
//! The star of the show is `cwo checkout`, which drives a pending order through the payment
//! flow the same way the storefront's payment page does: cached order first, server
//! re-validation, gateway order creation, proof verification, and only then local cleanup.

mod cache;
mod checkout;
mod client;
mod profile;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

use crate::{checkout::CheckoutFlow, client::StorefrontClient, profile::Profile};

#[derive(Parser)]
#[command(name = "cwo", about = "Cakes Wow order server tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pay for a pending order via the hosted gateway flow
    Checkout {
        /// The order to pay for. Falls back to the locally cached pending order.
        order_id: Option<String>,
    },
    /// Show an order's current status
    Order { order_id: String },
    /// Drain and display pending admin notifications (read-once!)
    Notifications,
    /// Check that the server is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();
    let profile = Profile::load()?;
    debug!("Using server {}", profile.server);
    let client = StorefrontClient::new(profile);

    match cli.command {
        Commands::Checkout { order_id } => CheckoutFlow::new(client).run(order_id).await,
        Commands::Order { order_id } => {
            let order = client.fetch_order(&order_id).await?;
            checkout::print_order_summary(&order);
            Ok(())
        },
        Commands::Notifications => {
            let notifications = client.drain_notifications().await?;
            if notifications.is_empty() {
                println!("No pending notifications.");
                return Ok(());
            }
            let mut table = prettytable::Table::new();
            table.add_row(prettytable::row!["Order", "Customer", "Amount", "When"]);
            for n in &notifications {
                table.add_row(prettytable::row![
                    n.order_id.as_str(),
                    n.customer_name,
                    n.total_amount.to_string(),
                    n.created_at.to_rfc3339()
                ]);
            }
            table.printstd();
            Ok(())
        },
        Commands::Health => {
            let status = client.health().await?;
            println!("{status}");
            Ok(())
        },
    }
}
