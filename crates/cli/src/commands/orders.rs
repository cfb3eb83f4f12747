//! Checkout, order listing, tracking, and status commands.

use clap::Subcommand;

use madina_client::MadinaClient;
use madina_client::types::{Address, CheckoutRequest, ListQuery, Order, PaymentMethod};
use madina_core::{Action, OrderId, OrderStatus};

use super::{CommandResult, require};

#[derive(Subcommand)]
pub enum OrderAction {
    /// Check the cart out into an order
    Checkout {
        /// Street address
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        postcode: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// cash_on_delivery, card, or mobile_banking
        #[arg(long, default_value = "cash_on_delivery")]
        payment: String,
    },
    /// List your own orders
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List every order in the store (back office)
    All {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Track one order
    Track {
        /// Order ID
        id: String,
    },
    /// Move an order to a new status (back office)
    SetStatus {
        /// Order ID
        id: String,
        /// pending, confirmed, processing, out_for_delivery, delivered, cancelled
        status: String,
        #[arg(long)]
        note: Option<String>,
    },
}

fn print_order_line(order: &Order) {
    println!(
        "{}  {}  {}  {}",
        order.id,
        order.created_at.format("%Y-%m-%d"),
        order.status,
        order.total
    );
}

pub async fn run(client: &MadinaClient, action: OrderAction) -> CommandResult {
    match action {
        OrderAction::Checkout {
            address,
            city,
            postcode,
            phone,
            payment,
        } => {
            require(client, Action::PlaceOrder).await?;
            let payment_method: PaymentMethod =
                serde_plain_parse(&payment).ok_or("unknown payment method")?;

            let order = client
                .orders()
                .checkout(&CheckoutRequest {
                    shipping_address: Address {
                        line1: address,
                        line2: None,
                        city,
                        postcode,
                        phone,
                    },
                    payment_method,
                })
                .await?;

            println!("order placed: {}", order.id);
            println!("total: {}", order.total);
        }
        OrderAction::List { page, limit } => {
            require(client, Action::ViewOwnOrders).await?;
            let result = client
                .orders()
                .mine(&ListQuery {
                    page,
                    limit,
                    search: None,
                })
                .await?;
            for order in &result.data {
                print_order_line(order);
            }
            println!("page {}/{} ({} total)", result.page, result.total_pages, result.total);
        }
        OrderAction::All {
            page,
            limit,
            search,
        } => {
            require(client, Action::ViewAllOrders).await?;
            let result = client
                .orders()
                .all(&ListQuery {
                    page,
                    limit,
                    search,
                })
                .await?;
            for order in &result.data {
                print_order_line(order);
            }
            println!("page {}/{} ({} total)", result.page, result.total_pages, result.total);
        }
        OrderAction::Track { id } => {
            require(client, Action::ViewOwnOrders).await?;
            let order = client.orders().track(&OrderId::new(id)).await?;

            println!("order {}  status: {}", order.id, order.status);
            for item in &order.items {
                println!("  {} x{}  {}", item.name, item.quantity, item.price.line_total(item.quantity));
            }
            println!("total: {}", order.total);
            for entry in &order.status_history {
                println!(
                    "  {}  {}{}",
                    entry.at.format("%Y-%m-%d %H:%M"),
                    entry.status,
                    entry
                        .note
                        .as_deref()
                        .map(|n| format!(" ({n})"))
                        .unwrap_or_default()
                );
            }
        }
        OrderAction::SetStatus { id, status, note } => {
            require(client, Action::UpdateOrderStatus).await?;
            let status: OrderStatus = serde_plain_parse(&status).ok_or("unknown order status")?;
            let order = client
                .orders()
                .update_status(&OrderId::new(id), status, note)
                .await?;
            println!("order {} is now {}", order.id, order.status);
        }
    }

    Ok(())
}

/// Parse a snake_case wire value via its serde representation.
fn serde_plain_parse<T: serde::de::DeserializeOwned>(s: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(s.to_owned())).ok()
}
