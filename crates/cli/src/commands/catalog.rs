//! Category and product commands.

use clap::Subcommand;
use rust_decimal::Decimal;

use madina_client::MadinaClient;
use madina_client::types::{CategoryInput, ListQuery, ProductInput};
use madina_core::{Action, CategoryId, Price, ProductId};

use super::{CommandResult, require};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a category (back office)
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category (back office)
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one product
    Show { id: String },
    /// Create a product (back office)
    Create {
        #[arg(short, long)]
        name: String,
        /// Unit price in taka
        #[arg(short, long)]
        price: Decimal,
        /// Units in stock
        #[arg(short, long)]
        stock: u32,
        #[arg(short, long)]
        description: Option<String>,
        /// Category ID
        #[arg(short, long)]
        category: Option<String>,
        /// Only dispensed against a prescription
        #[arg(long)]
        prescription: bool,
    },
    /// Delete a product (back office)
    Delete { id: String },
}

const fn list_query(page: Option<u32>, limit: Option<u32>, search: Option<String>) -> ListQuery {
    ListQuery {
        page,
        limit,
        search,
    }
}

pub async fn run_categories(client: &MadinaClient, action: CategoryAction) -> CommandResult {
    match action {
        CategoryAction::List {
            page,
            limit,
            search,
        } => {
            require(client, Action::BrowseCatalog).await?;
            let result = client
                .catalog()
                .categories(&list_query(page, limit, search))
                .await?;

            for category in &result.data {
                println!(
                    "{}  {}  {}",
                    category.id,
                    category.name,
                    category.description.as_deref().unwrap_or("")
                );
            }
            println!("page {}/{} ({} total)", result.page, result.total_pages, result.total);
        }
        CategoryAction::Create { name, description } => {
            require(client, Action::ManageCatalog).await?;
            let category = client
                .catalog()
                .create_category(&CategoryInput {
                    name,
                    description,
                    image: None,
                })
                .await?;
            println!("created category {}", category.id);
        }
        CategoryAction::Delete { id } => {
            require(client, Action::ManageCatalog).await?;
            client
                .catalog()
                .delete_category(&CategoryId::new(id))
                .await?;
            println!("deleted");
        }
    }

    Ok(())
}

pub async fn run_products(client: &MadinaClient, action: ProductAction) -> CommandResult {
    match action {
        ProductAction::List {
            page,
            limit,
            search,
        } => {
            require(client, Action::BrowseCatalog).await?;
            let result = client
                .catalog()
                .products(&list_query(page, limit, search))
                .await?;

            for product in &result.data {
                let rx = if product.requires_prescription { " [Rx]" } else { "" };
                println!(
                    "{}  {}  {}  stock {}{rx}",
                    product.id, product.name, product.price, product.stock
                );
            }
            println!("page {}/{} ({} total)", result.page, result.total_pages, result.total);
        }
        ProductAction::Show { id } => {
            require(client, Action::BrowseCatalog).await?;
            let product = client.catalog().product(&ProductId::new(id)).await?;

            println!("{}  {}", product.id, product.name);
            println!("price: {}", product.price);
            println!("stock: {}", product.stock);
            if let Some(description) = &product.description {
                println!("{description}");
            }
            if product.requires_prescription {
                println!("prescription required");
            }
        }
        ProductAction::Create {
            name,
            price,
            stock,
            description,
            category,
            prescription,
        } => {
            require(client, Action::ManageCatalog).await?;
            let product = client
                .catalog()
                .create_product(&ProductInput {
                    name,
                    description,
                    price: Price::new(price),
                    stock,
                    category: category.map(CategoryId::new),
                    image: None,
                    requires_prescription: prescription,
                })
                .await?;
            println!("created product {}", product.id);
        }
        ProductAction::Delete { id } => {
            require(client, Action::ManageCatalog).await?;
            client.catalog().delete_product(&ProductId::new(id)).await?;
            println!("deleted");
        }
    }

    Ok(())
}
