//! Cart commands.

use clap::Subcommand;

use madina_client::MadinaClient;
use madina_client::types::Cart;
use madina_core::{Action, CartItemId, ProductId};

use super::{CommandResult, require};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        product: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity
    Update {
        /// Cart line ID
        item: String,
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Cart line ID
        item: String,
    },
    /// Empty the cart
    Clear,
}

fn print_cart(cart: &Cart) {
    if cart.items.is_empty() {
        println!("cart is empty");
        return;
    }

    for item in &cart.items {
        println!(
            "{}  {} x{}  {}",
            item.id,
            item.product.name,
            item.quantity,
            item.line_total()
        );
    }
    println!("subtotal: {} ({} items)", cart.subtotal(), cart.unit_count());
}

pub async fn run(client: &MadinaClient, action: CartAction) -> CommandResult {
    require(client, Action::MutateOwnCart).await?;

    match action {
        CartAction::Show => {
            let cart = client.cart().cart().await?;
            print_cart(&cart);
        }
        CartAction::Add { product, quantity } => {
            let cart = client.cart().add(ProductId::new(product), quantity).await?;
            print_cart(&cart);
        }
        CartAction::Update { item, quantity } => {
            let cart = client
                .cart()
                .update_item(&CartItemId::new(item), quantity)
                .await?;
            print_cart(&cart);
        }
        CartAction::Remove { item } => {
            let cart = client.cart().remove_item(&CartItemId::new(item)).await?;
            print_cart(&cart);
        }
        CartAction::Clear => {
            client.cart().clear().await?;
            println!("cart cleared");
        }
    }

    Ok(())
}
