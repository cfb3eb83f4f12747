//! Wire types for the pharmacy REST API.
//!
//! These mirror the backend's JSON (camelCase keys) for display and mutation
//! input. The client holds no authoritative state for any of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use madina_core::{
    CartItemId, CategoryId, Email, JobId, JobStatus, OrderId, OrderStatus, PaymentStatus, Price,
    ProductId, Role, UserId,
};

use crate::error::ApiError;
use crate::session::SessionTokens;

// =============================================================================
// Envelope & Pagination
// =============================================================================

/// The server's uniform response envelope.
///
/// Every endpoint except token refresh wraps its payload in
/// `{"success": bool, "message": string, "data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// One page of a listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total matching items.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

/// Listing parameters accepted by every collection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Free-text search filter.
    pub search: Option<String>,
}

impl ListQuery {
    /// A query for one specific page with the given size.
    #[must_use]
    pub const fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            search: None,
        }
    }

    /// A free-text search across all pages.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            page: None,
            limit: None,
            search: Some(term.into()),
        }
    }

    /// Render as query-string pairs, omitting unset parameters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }

    /// Stable cache-key fragment for this query.
    #[must_use]
    pub(crate) fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.page.map_or_else(String::new, |p| p.to_string()),
            self.limit.map_or_else(String::new, |l| l.to_string()),
            self.search.as_deref().unwrap_or("")
        )
    }
}

// =============================================================================
// Users & Auth
// =============================================================================

/// A user profile as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

/// Payload of a successful login or registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(flatten)]
    pub tokens: SessionTokens,
    pub user: UserProfile,
}

/// Registration input, validated client-side before any request is issued.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterInput {
    const MIN_PASSWORD_LENGTH: usize = 8;

    /// Validate the input and produce the request body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an empty name, a malformed email,
    /// a short password, or a mismatched confirmation.
    pub fn validate(&self) -> Result<RegisterRequest, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name cannot be empty".to_owned()));
        }

        let email: Email = self
            .email
            .parse()
            .map_err(|e: madina_core::EmailError| ApiError::Validation(e.to_string()))?;

        if self.password.len() < Self::MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LENGTH
            )));
        }

        if self.password != self.confirm_password {
            return Err(ApiError::Validation("passwords do not match".to_owned()));
        }

        Ok(RegisterRequest {
            name: self.name.trim().to_owned(),
            email,
            phone: self.phone.clone(),
            password: self.password.clone(),
        })
    }
}

/// Validated registration request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    /// Units currently in stock.
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Whether the item may only be dispensed against a prescription.
    #[serde(default)]
    pub requires_prescription: bool,
}

/// Input for creating or updating a category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Input for creating or updating a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub requires_prescription: bool,
}

// =============================================================================
// Cart
// =============================================================================

/// One line in the user's cart, with the product populated by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Line total for this item.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.line_total(self.quantity)
    }
}

/// The user's cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Request body for adding a product to the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Request body for changing a cart line's quantity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

// =============================================================================
// Orders
// =============================================================================

/// Delivery address for checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    Card,
    MobileBanking,
}

/// One line of a placed order (denormalized snapshot of the product).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

/// One entry in an order's status history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: Address,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status_history: Vec<StatusEntry>,
}

/// Checkout request body; the server builds the order from the stored cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
}

/// Request body for moving an order through its lifecycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// =============================================================================
// Jobs
// =============================================================================

/// A delivery job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub order: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider: Option<UserId>,
    pub address: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or updating a delivery job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub order: OrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider: Option<UserId>,
    pub address: String,
}

/// Request body for a rider updating a job's delivery status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(price: i64, id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: "Paracetamol 500mg".to_owned(),
            description: None,
            price: Price::new(Decimal::from(price)),
            stock: 10,
            category: None,
            image: None,
            requires_prescription: false,
        }
    }

    #[test]
    fn test_list_query_pairs() {
        let query = ListQuery {
            page: Some(2),
            limit: Some(20),
            search: Some("napa".to_owned()),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "2".to_owned()),
                ("limit", "20".to_owned()),
                ("search", "napa".to_owned()),
            ]
        );

        assert!(ListQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart {
            items: vec![
                CartItem {
                    id: CartItemId::new("l1"),
                    product: product(50, "p1"),
                    quantity: 2,
                },
                CartItem {
                    id: CartItemId::new("l2"),
                    product: product(120, "p2"),
                    quantity: 1,
                },
            ],
        };
        assert_eq!(cart.subtotal(), Price::from_major(220));
        assert_eq!(cart.unit_count(), 3);
    }

    #[test]
    fn test_register_input_rejects_mismatched_passwords() {
        let input = RegisterInput {
            name: "Asha".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: None,
            password: "correct-horse".to_owned(),
            confirm_password: "correct-mouse".to_owned(),
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn test_register_input_rejects_short_password_and_bad_email() {
        let mut input = RegisterInput {
            name: "Asha".to_owned(),
            email: "not-an-email".to_owned(),
            phone: None,
            password: "correct-horse".to_owned(),
            confirm_password: "correct-horse".to_owned(),
        };
        assert!(input.validate().is_err());

        input.email = "asha@example.com".to_owned();
        input.password = "short".to_owned();
        input.confirm_password = "short".to_owned();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_register_input_valid() {
        let input = RegisterInput {
            name: "  Asha  ".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: Some("01700000000".to_owned()),
            password: "correct-horse".to_owned(),
            confirm_password: "correct-horse".to_owned(),
        };
        let request = input.validate().unwrap();
        assert_eq!(request.name, "Asha");
    }

    #[test]
    fn test_auth_payload_decodes_flat_tokens() {
        let json = serde_json::json!({
            "accessToken": "A1",
            "refreshToken": "R1",
            "user": {
                "id": "u1",
                "name": "Asha",
                "email": "asha@example.com",
                "role": "customer"
            }
        });
        let payload: AuthPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.tokens.access_token, "A1");
        assert_eq!(payload.user.name, "Asha");
    }

    #[test]
    fn test_page_decodes_camel_case() {
        let json = serde_json::json!({
            "data": [],
            "page": 1,
            "limit": 10,
            "total": 0,
            "totalPages": 0
        });
        let page: Page<Product> = serde_json::from_value(json).unwrap();
        assert_eq!(page.total_pages, 0);
    }
}
