//! Authenticated request gateway.
//!
//! Every outbound call goes through here: the gateway attaches the current
//! access token as a bearer credential, dispatches the request, and on a 401
//! performs at most one silent refresh-and-retry. A failed refresh clears the
//! session and surfaces [`ApiError::SessionExpired`]; the caller owns the
//! actual navigation to the login entry point.
//!
//! Refresh is coordinated through a single-flight guard: an async mutex plus
//! a token-generation check, so two concurrent 401s produce exactly one
//! refresh call.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::session::{SessionStore, SessionStoreError, SessionTokens};
use crate::types::Envelope;

/// Path of the dedicated token-refresh endpoint.
pub(crate) const REFRESH_PATH: &str = "/user/refresh-token";

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: String,
}

/// Why a refresh attempt did not yield a usable access token.
enum RefreshError {
    /// No refresh token in storage; the original 401 must be propagated.
    MissingRefreshToken,
    /// The refresh call failed; the session has already been cleared.
    Expired,
    /// Session storage itself failed.
    Store(SessionStoreError),
}

/// The authenticated request gateway.
///
/// Cheaply cloneable via `Arc`; safe to share across tasks.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: reqwest::Client,
    base_url: String,
    login_path: String,
    store: Arc<dyn SessionStore>,
    /// Single-flight guard for the refresh procedure.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl Gateway {
    /// Create a gateway over the given configuration and session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                http,
                base_url: config.base_url().to_owned(),
                login_path: config.login_path.clone(),
                store,
                refresh_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// The session store this gateway reads and mutates.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Login entry point surfaced on session expiry.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.inner.login_path
    }

    // =========================================================================
    // Request methods
    // =========================================================================

    /// `GET` a resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// failed envelope.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, query, None).await
    }

    /// `POST` a JSON body and decode the enveloped response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// failed envelope.
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, &[], Some(serde_json::to_value(body)?))
            .await
    }

    /// `PUT` a JSON body and decode the enveloped response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// failed envelope.
    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, &[], Some(serde_json::to_value(body)?))
            .await
    }

    /// `DELETE` a resource and decode the enveloped response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// failed envelope.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// `DELETE` a resource, ignoring any envelope payload.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// failed envelope.
    pub async fn delete_empty(&self, path: &str) -> Result<(), ApiError> {
        self.request::<Value>(Method::DELETE, path, &[], None)
            .await
            .map(|_| ())
    }

    /// `POST` without a body, ignoring any envelope payload.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// failed envelope.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.request::<Value>(Method::POST, path, &[], None)
            .await
            .map(|_| ())
    }

    /// Force a refresh of the current token pair, outside the 401 path.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` if the refresh fails (the session
    /// is cleared first), or `ApiError::Status` with the would-be 401 when no
    /// refresh token is stored.
    pub async fn refresh_now(&self) -> Result<(), ApiError> {
        let current = self.inner.store.access_token().await?;
        match self.refresh_access_token(current.as_deref()).await {
            Ok(_) => Ok(()),
            Err(RefreshError::MissingRefreshToken) => Err(ApiError::Status {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                message: "no refresh token stored".to_owned(),
            }),
            Err(RefreshError::Expired) => Err(self.session_expired()),
            Err(RefreshError::Store(e)) => Err(e.into()),
        }
    }

    // =========================================================================
    // Core request flow
    // =========================================================================

    /// Dispatch one request with the gateway's auth protocol.
    ///
    /// Try once with the stored access token; on 401, refresh (single-flight)
    /// and retry exactly once. A second 401 on the retry is returned as a
    /// plain status error, never retried again.
    #[instrument(skip(self, query, body), fields(path = %path))]
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let access = self.inner.store.access_token().await?;

        let response = self
            .dispatch(&method, path, query, body.as_ref(), access.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        debug!("unauthorized response, attempting token refresh");
        let original = Self::status_error(
            StatusCode::UNAUTHORIZED,
            &response.text().await.unwrap_or_default(),
        );

        match self.refresh_access_token(access.as_deref()).await {
            Ok(token) => {
                let retry = self
                    .dispatch(&method, path, query, body.as_ref(), Some(&token))
                    .await?;
                Self::decode(retry).await
            }
            Err(RefreshError::MissingRefreshToken) => Err(original),
            Err(RefreshError::Expired) => Err(self.session_expired()),
            Err(RefreshError::Store(e)) => Err(e.into()),
        }
    }

    /// Build and send one HTTP request.
    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{path}", self.inner.base_url);
        let mut request = self.inner.http.request(method.clone(), url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        Ok(request.send().await?)
    }

    /// Refresh the access token, deduplicating concurrent attempts.
    ///
    /// `stale_access` is the token that produced the 401. After acquiring the
    /// lock, if storage already holds a different access token another task
    /// refreshed while we waited; return it without issuing a second refresh
    /// call.
    async fn refresh_access_token(
        &self,
        stale_access: Option<&str>,
    ) -> Result<String, RefreshError> {
        let _guard = self.inner.refresh_lock.lock().await;

        if let Some(current) = self
            .inner
            .store
            .access_token()
            .await
            .map_err(RefreshError::Store)?
            && stale_access != Some(current.as_str())
        {
            debug!("token already refreshed by a concurrent request");
            return Ok(current);
        }

        let Some(refresh_token) = self
            .inner
            .store
            .refresh_token()
            .await
            .map_err(RefreshError::Store)?
        else {
            return Err(RefreshError::MissingRefreshToken);
        };

        let url = format!("{}{REFRESH_PATH}", self.inner.base_url);
        let response = match self
            .inner
            .http
            .post(url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "token refresh transport failure");
                self.expire_session().await;
                return Err(RefreshError::Expired);
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "token refresh rejected");
            self.expire_session().await;
            return Err(RefreshError::Expired);
        }

        // The refresh endpoint returns the token pair directly, unenveloped.
        let tokens: SessionTokens = match response.json().await {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!(%error, "token refresh response unreadable");
                self.expire_session().await;
                return Err(RefreshError::Expired);
            }
        };

        self.inner
            .store
            .store_tokens(&tokens)
            .await
            .map_err(RefreshError::Store)?;

        debug!("access token refreshed");
        Ok(tokens.access_token)
    }

    /// Clear all persisted session state after a failed refresh.
    async fn expire_session(&self) {
        if let Err(error) = self.inner.store.clear().await {
            warn!(%error, "failed to clear session state");
        }
        warn!(
            login = %self.inner.login_path,
            "session expired, re-authentication required"
        );
    }

    fn session_expired(&self) -> ApiError {
        ApiError::SessionExpired {
            login_path: self.inner.login_path.clone(),
        }
    }

    // =========================================================================
    // Response decoding
    // =========================================================================

    /// Decode a response: non-success statuses become opaque errors, then the
    /// envelope is unwrapped.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        // Read the body as text first for better error diagnostics.
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, &text));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text)?;

        if !envelope.success {
            return Err(ApiError::Api {
                message: envelope.message,
            });
        }

        match envelope.data {
            Some(data) => Ok(data),
            // Mutation acknowledgements omit the data field; only targets
            // that accept null (such as Value) decode from an absent one.
            None => serde_json::from_value(Value::Null).map_err(|_| ApiError::Api {
                message: "response missing data".to_owned(),
            }),
        }
    }

    /// Build an opaque status error, extracting the server's message when the
    /// body carries one.
    fn status_error(status: StatusCode, body: &str) -> ApiError {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
            |_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            },
            |b| b.message,
        );

        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_extracts_server_message() {
        let err = Gateway::status_error(StatusCode::NOT_FOUND, r#"{"message":"no such product"}"#);
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such product");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_status_error_falls_back_to_reason_phrase() {
        let err = Gateway::status_error(StatusCode::BAD_GATEWAY, "<html>nope</html>");
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_refresh_request_wire_shape() {
        let body = RefreshRequest {
            refresh_token: "R1".to_owned(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"refreshToken":"R1"}"#
        );
    }
}
