//! Madina Pharmacy CLI - storefront and back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Account
//! madina auth register -n "Asha Rahman" -e asha@example.com
//! madina auth login -e asha@example.com
//! madina auth whoami
//!
//! # Shopping
//! madina products list --search napa
//! madina cart add <product-id> --quantity 2
//! madina orders checkout --address "12 Green Road" --city Dhaka
//! madina orders track <order-id>
//!
//! # Back office (admin/manager/rider accounts)
//! madina products create -n "Napa Extra" -p 35.50 -s 200
//! madina orders all
//! madina jobs mine
//! ```
//!
//! Configuration comes from the environment (`MADINA_API_BASE_URL` etc.);
//! see `madina_client::ApiConfig`.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal output is this binary's purpose.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "madina")]
#[command(author, version, about = "Madina Pharmacy command-line tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account registration, login, and session management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Browse and manage product categories
    Categories {
        #[command(subcommand)]
        action: commands::catalog::CategoryAction,
    },
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: commands::catalog::ProductAction,
    },
    /// View and mutate the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Checkout, order listing, and tracking
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrderAction,
    },
    /// Delivery job management
    Jobs {
        #[command(subcommand)]
        action: commands::jobs::JobAction,
    },
}

#[tokio::main]
async fn main() {
    // Keep command output clean unless RUST_LOG says otherwise.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("madina_cli=info,madina_client=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = commands::build_client()?;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&client, action).await,
        Commands::Categories { action } => commands::catalog::run_categories(&client, action).await,
        Commands::Products { action } => commands::catalog::run_products(&client, action).await,
        Commands::Cart { action } => commands::cart::run(&client, action).await,
        Commands::Orders { action } => commands::orders::run(&client, action).await,
        Commands::Jobs { action } => commands::jobs::run(&client, action).await,
    }
}
