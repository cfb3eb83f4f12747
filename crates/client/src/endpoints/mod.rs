//! Resource-oriented wrappers over the pharmacy REST API.
//!
//! Each wrapper delegates to the [`Gateway`](crate::gateway::Gateway); none
//! of them touch headers or tokens directly.

mod auth;
mod cart;
mod catalog;
mod jobs;
mod orders;

pub use auth::AuthApi;
pub use cart::CartApi;
pub use catalog::CatalogApi;
pub use jobs::JobsApi;
pub use orders::OrdersApi;
