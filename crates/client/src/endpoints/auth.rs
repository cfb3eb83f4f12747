//! User authentication and account endpoints.

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::types::{AuthPayload, LoginRequest, RegisterInput, UserProfile};

const REGISTER_PATH: &str = "/user/register";
const LOGIN_PATH: &str = "/user/login";
const PROFILE_PATH: &str = "/user/profile";

/// Authentication operations: register, login, refresh, profile, logout.
#[derive(Clone)]
pub struct AuthApi {
    gateway: Gateway,
}

impl AuthApi {
    pub(crate) const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Register a new customer account and start a session.
    ///
    /// Validates the input client-side first; nothing is sent when
    /// validation fails.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for bad input, or any gateway error
    /// from the registration call.
    pub async fn register(&self, input: &RegisterInput) -> Result<UserProfile, ApiError> {
        let request = input.validate()?;
        let payload: AuthPayload = self.gateway.post(REGISTER_PATH, &request).await?;
        self.persist(payload).await
    }

    /// Log in with email and password and start a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session
    /// cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let request = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let payload: AuthPayload = self.gateway.post(LOGIN_PATH, &request).await?;
        self.persist(payload).await
    }

    /// Force a token refresh outside the gateway's 401 path.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` when the refresh fails.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.gateway.refresh_now().await
    }

    /// Fetch the authenticated user's profile from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not authenticated.
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.gateway.get(PROFILE_PATH, &[]).await
    }

    /// The locally stored profile, if a session exists.
    ///
    /// # Errors
    ///
    /// Returns an error if session storage cannot be read.
    pub async fn current_user(&self) -> Result<Option<UserProfile>, ApiError> {
        Ok(self.gateway.store().profile().await?)
    }

    /// End the session.
    ///
    /// Purely client-side: the backend holds no session object, so logout is
    /// destruction of the local credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if session storage cannot be cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        Ok(self.gateway.store().clear().await?)
    }

    async fn persist(&self, payload: AuthPayload) -> Result<UserProfile, ApiError> {
        let store = self.gateway.store();
        store.store_tokens(&payload.tokens).await?;
        store.store_profile(&payload.user).await?;
        Ok(payload.user)
    }
}
