//! Order endpoints: checkout, listing, tracking, and status updates.

use madina_core::{OrderId, OrderStatus};

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::types::{CheckoutRequest, ListQuery, Order, Page, UpdateOrderStatusRequest};

const CREATE_ORDER_PATH: &str = "/order/createOrder";
const USER_ORDERS_PATH: &str = "/order/getUserOrders";
const ALL_ORDERS_PATH: &str = "/order/getAllOrders";

/// Order operations.
#[derive(Clone)]
pub struct OrdersApi {
    gateway: Gateway,
}

impl OrdersApi {
    pub(crate) const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Check the current cart out into an order.
    ///
    /// The server builds the order from the stored cart and empties it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or the request fails.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<Order, ApiError> {
        self.gateway.post(CREATE_ORDER_PATH, request).await
    }

    /// List the caller's own orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not authenticated or the request
    /// fails.
    pub async fn mine(&self, query: &ListQuery) -> Result<Page<Order>, ApiError> {
        self.gateway.get(USER_ORDERS_PATH, &query.to_pairs()).await
    }

    /// List every order in the store (admin/manager dashboards).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller lacks permission or the request fails.
    pub async fn all(&self, query: &ListQuery) -> Result<Page<Order>, ApiError> {
        self.gateway.get(ALL_ORDERS_PATH, &query.to_pairs()).await
    }

    /// Track one order, including its status history.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    pub async fn track(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.gateway
            .get(&format!("/order/trackOrder/{id}"), &[])
            .await
    }

    /// Move an order through its status lifecycle.
    ///
    /// The transition itself is validated server-side;
    /// [`OrderStatus::can_transition_to`] lets callers pre-check.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is rejected or the request fails.
    pub async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, ApiError> {
        self.gateway
            .put(
                &format!("/order/updateOrderStatus/{id}"),
                &UpdateOrderStatusRequest { status, note },
            )
            .await
    }
}
