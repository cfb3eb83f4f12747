//! Cart endpoints.
//!
//! The cart lives server-side; every mutation returns the updated cart so
//! callers never have to reconcile local state.

use madina_core::{CartItemId, ProductId};

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::types::{AddToCartRequest, Cart, UpdateCartItemRequest};

const GET_CART_PATH: &str = "/cart/getUserCart";
const ADD_TO_CART_PATH: &str = "/cart/addToCart";
const CLEAR_CART_PATH: &str = "/cart/clearCart";

/// Cart operations for the authenticated user.
#[derive(Clone)]
pub struct CartApi {
    gateway: Gateway,
}

impl CartApi {
    pub(crate) const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Fetch the user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not authenticated or the request
    /// fails.
    pub async fn cart(&self) -> Result<Cart, ApiError> {
        self.gateway.get(GET_CART_PATH, &[]).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a zero quantity, or any gateway
    /// error.
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Result<Cart, ApiError> {
        if quantity == 0 {
            return Err(ApiError::Validation(
                "quantity must be at least 1".to_owned(),
            ));
        }

        self.gateway
            .post(
                ADD_TO_CART_PATH,
                &AddToCartRequest {
                    product_id,
                    quantity,
                },
            )
            .await
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a zero quantity, or any gateway
    /// error.
    pub async fn update_item(&self, item: &CartItemId, quantity: u32) -> Result<Cart, ApiError> {
        if quantity == 0 {
            return Err(ApiError::Validation(
                "quantity must be at least 1; remove the item instead".to_owned(),
            ));
        }

        self.gateway
            .put(
                &format!("/cart/updateCartItem/{item}"),
                &UpdateCartItemRequest { quantity },
            )
            .await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    pub async fn remove_item(&self, item: &CartItemId) -> Result<Cart, ApiError> {
        self.gateway
            .delete(&format!("/cart/removeFromCart/{item}"))
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.gateway.delete_empty(CLEAR_CART_PATH).await
    }
}
