//! Category and product endpoints, with read caching.
//!
//! Listings and single reads are served through a `moka` cache (5-minute
//! TTL); any catalog mutation invalidates the whole cache.

use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use madina_core::{CategoryId, ProductId};

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::types::{Category, CategoryInput, ListQuery, Page, Product, ProductInput};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Cached catalog responses.
#[derive(Clone)]
enum CacheValue {
    Category(Box<Category>),
    Categories(Box<Page<Category>>),
    Product(Box<Product>),
    Products(Box<Page<Product>>),
}

/// Catalog operations: categories and products.
#[derive(Clone)]
pub struct CatalogApi {
    gateway: Gateway,
    cache: Cache<String, CacheValue>,
}

impl CatalogApi {
    pub(crate) fn new(gateway: Gateway) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self { gateway, cache }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn categories(&self, query: &ListQuery) -> Result<Page<Category>, ApiError> {
        let cache_key = format!("categories:{}", query.cache_key());

        if let Some(CacheValue::Categories(page)) = self.cache.get(&cache_key).await {
            debug!("cache hit for category listing");
            return Ok(*page);
        }

        let page: Page<Category> = self
            .gateway
            .get("/category/getAllCategories", &query.to_pairs())
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Categories(Box::new(page.clone())))
            .await;

        Ok(page)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the request fails.
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let cache_key = format!("category:{id}");

        if let Some(CacheValue::Category(category)) = self.cache.get(&cache_key).await {
            debug!("cache hit for category");
            return Ok(*category);
        }

        let category: Category = self
            .gateway
            .get(&format!("/category/getCategory/{id}"), &[])
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or input is rejected.
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let category = self.gateway.post("/category/createCategory", input).await?;
        self.invalidate();
        Ok(category)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or input is rejected.
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category = self
            .gateway
            .put(&format!("/category/updateCategory/{id}"), input)
            .await?;
        self.invalidate();
        Ok(category)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), ApiError> {
        self.gateway
            .delete_empty(&format!("/category/deleteCategory/{id}"))
            .await?;
        self.invalidate();
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn products(&self, query: &ListQuery) -> Result<Page<Product>, ApiError> {
        let cache_key = format!("products:{}", query.cache_key());

        if let Some(CacheValue::Products(page)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product listing");
            return Ok(*page);
        }

        let page: Page<Product> = self
            .gateway
            .get("/product/getAllProducts", &query.to_pairs())
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Products(Box::new(page.clone())))
            .await;

        Ok(page)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .gateway
            .get(&format!("/product/getProduct/{id}"), &[])
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or input is rejected.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self.gateway.post("/product/createProduct", input).await?;
        self.invalidate();
        Ok(product)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or input is rejected.
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product = self
            .gateway
            .put(&format!("/product/updateProduct/{id}"), input)
            .await?;
        self.invalidate();
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.gateway
            .delete_empty(&format!("/product/deleteProduct/{id}"))
            .await?;
        self.invalidate();
        Ok(())
    }

    /// Drop every cached read after a catalog mutation.
    fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
