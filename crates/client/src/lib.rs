//! Madina Pharmacy API client.
//!
//! A typed client for the pharmacy's REST backend. All outbound calls go
//! through the [`gateway::Gateway`], which attaches the session's bearer
//! token and transparently performs a single refresh-and-retry on credential
//! expiry.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use madina_client::{ApiConfig, MadinaClient};
//! use madina_client::session::FileSessionStore;
//!
//! let config = ApiConfig::from_env()?;
//! let store = Arc::new(FileSessionStore::new(session_path));
//! let client = MadinaClient::new(&config, store)?;
//!
//! client.auth().login("asha@example.com", "correct-horse").await?;
//! let products = client.catalog().products(&Default::default()).await?;
//! let cart = client.cart().add(products.data[0].id.clone(), 1).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod session;
pub mod types;

use std::sync::Arc;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use gateway::Gateway;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SessionTokens};

use endpoints::{AuthApi, CartApi, CatalogApi, JobsApi, OrdersApi};

/// Facade over the gateway and the per-resource endpoint wrappers.
///
/// Cheaply cloneable; all clones share one gateway, one session store, and
/// one catalog cache.
#[derive(Clone)]
pub struct MadinaClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    gateway: Gateway,
    auth: AuthApi,
    catalog: CatalogApi,
    cart: CartApi,
    orders: OrdersApi,
    jobs: JobsApi,
}

impl MadinaClient {
    /// Create a client over the given configuration and session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let gateway = Gateway::new(config, store)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                auth: AuthApi::new(gateway.clone()),
                catalog: CatalogApi::new(gateway.clone()),
                cart: CartApi::new(gateway.clone()),
                orders: OrdersApi::new(gateway.clone()),
                jobs: JobsApi::new(gateway.clone()),
                gateway,
            }),
        })
    }

    /// The underlying request gateway.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    /// Authentication and account operations.
    #[must_use]
    pub fn auth(&self) -> &AuthApi {
        &self.inner.auth
    }

    /// Category and product operations.
    #[must_use]
    pub fn catalog(&self) -> &CatalogApi {
        &self.inner.catalog
    }

    /// Cart operations.
    #[must_use]
    pub fn cart(&self) -> &CartApi {
        &self.inner.cart
    }

    /// Order operations.
    #[must_use]
    pub fn orders(&self) -> &OrdersApi {
        &self.inner.orders
    }

    /// Delivery job operations.
    #[must_use]
    pub fn jobs(&self) -> &JobsApi {
        &self.inner.jobs
    }
}
