//! Account roles and the authorization decision function.
//!
//! The backend reports a role string on every user profile. Roles are a
//! closed enumeration here, and every privileged code path asks the single
//! [`Role::can`] decision function instead of comparing strings.

use serde::{Deserialize, Serialize};

/// Account role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shopper: browse, maintain a cart, place and track own orders.
    #[default]
    Customer,
    /// Full access to catalog, orders, and delivery jobs.
    Admin,
    /// Store operations: catalog management and order handling.
    Manager,
    /// Delivery rider: assigned jobs and delivery status updates.
    Rider,
}

/// An operation that requires an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// List and view categories and products.
    BrowseCatalog,
    /// Add, update, or remove items in the caller's own cart.
    MutateOwnCart,
    /// Check out the cart into an order.
    PlaceOrder,
    /// List and track the caller's own orders.
    ViewOwnOrders,
    /// List every order in the store.
    ViewAllOrders,
    /// Move an order through its status lifecycle.
    UpdateOrderStatus,
    /// Create, update, or delete categories and products.
    ManageCatalog,
    /// Create, update, or delete delivery jobs.
    ManageJobs,
    /// List delivery jobs assigned to the caller.
    ViewAssignedJobs,
    /// Update the delivery status of an assigned job.
    UpdateJobStatus,
}

impl Role {
    /// The single authorization decision function.
    ///
    /// All role-based branching in the workspace goes through here; there is
    /// no other place that inspects the role.
    #[must_use]
    pub const fn can(self, action: Action) -> bool {
        match self {
            Self::Customer => matches!(
                action,
                Action::BrowseCatalog
                    | Action::MutateOwnCart
                    | Action::PlaceOrder
                    | Action::ViewOwnOrders
            ),
            Self::Admin => true,
            Self::Manager => matches!(
                action,
                Action::BrowseCatalog
                    | Action::ViewAllOrders
                    | Action::UpdateOrderStatus
                    | Action::ManageCatalog
            ),
            Self::Rider => matches!(
                action,
                Action::BrowseCatalog
                    | Action::ViewAssignedJobs
                    | Action::UpdateJobStatus
                    | Action::UpdateOrderStatus
            ),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Rider => write!(f, "rider"),
        }
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "rider" => Ok(Self::Rider),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_permissions() {
        assert!(Role::Customer.can(Action::BrowseCatalog));
        assert!(Role::Customer.can(Action::MutateOwnCart));
        assert!(Role::Customer.can(Action::PlaceOrder));
        assert!(!Role::Customer.can(Action::ViewAllOrders));
        assert!(!Role::Customer.can(Action::ManageCatalog));
    }

    #[test]
    fn test_admin_can_everything() {
        assert!(Role::Admin.can(Action::ManageCatalog));
        assert!(Role::Admin.can(Action::ManageJobs));
        assert!(Role::Admin.can(Action::ViewAllOrders));
        assert!(Role::Admin.can(Action::MutateOwnCart));
    }

    #[test]
    fn test_manager_permissions() {
        assert!(Role::Manager.can(Action::ViewAllOrders));
        assert!(Role::Manager.can(Action::UpdateOrderStatus));
        assert!(Role::Manager.can(Action::ManageCatalog));
        assert!(!Role::Manager.can(Action::ManageJobs));
        assert!(!Role::Manager.can(Action::ViewAssignedJobs));
    }

    #[test]
    fn test_rider_permissions() {
        assert!(Role::Rider.can(Action::ViewAssignedJobs));
        assert!(Role::Rider.can(Action::UpdateJobStatus));
        assert!(!Role::Rider.can(Action::ManageCatalog));
        assert!(!Role::Rider.can(Action::PlaceOrder));
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for role in [Role::Customer, Role::Admin, Role::Manager, Role::Rider] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_unknown_role_fails_loudly() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Role::Rider).unwrap();
        assert_eq!(json, "\"rider\"");
        let parsed: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(parsed, Role::Manager);
    }
}
