//! Session credential storage.
//!
//! A session is one JSON document with three well-known keys — `accessToken`,
//! `refreshToken`, and `user` — matching the layout the backend's web client
//! persists. Stores are read and written opportunistically with no locking;
//! the last write wins.
//!
//! Two implementations:
//! - [`MemorySessionStore`] for tests and ephemeral sessions
//! - [`FileSessionStore`] for CLI persistence across invocations

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::UserProfile;

/// Errors that can occur when reading or writing session state.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Filesystem access failed.
    #[error("session i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document is not valid JSON.
    #[error("corrupt session document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// An access/refresh token pair, as issued by login and refresh responses.
///
/// `Debug` is implemented manually so token values never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    /// Short-lived bearer credential authorizing API calls.
    pub access_token: String,
    /// Longer-lived credential used solely to mint a new access token.
    pub refresh_token: String,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// The persisted session document.
///
/// Field names are the storage keys; every field is independently optional
/// so a partially-written session still round-trips.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserProfile>,
}

/// Storage for the current session's credentials and profile.
///
/// The gateway reads tokens before every request and replaces them after a
/// successful refresh; `clear` wipes the whole document (the refresh-failure
/// path).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current access token, if any.
    async fn access_token(&self) -> Result<Option<String>, SessionStoreError>;

    /// Current refresh token, if any.
    async fn refresh_token(&self) -> Result<Option<String>, SessionStoreError>;

    /// The stored user profile, if any.
    async fn profile(&self) -> Result<Option<UserProfile>, SessionStoreError>;

    /// Replace both tokens, leaving the profile untouched.
    async fn store_tokens(&self, tokens: &SessionTokens) -> Result<(), SessionStoreError>;

    /// Replace the stored user profile, leaving tokens untouched.
    async fn store_profile(&self, profile: &UserProfile) -> Result<(), SessionStoreError>;

    /// Destroy the entire session document.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}

// =============================================================================
// MemorySessionStore
// =============================================================================

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    doc: RwLock<SessionDocument>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a token pair.
    #[must_use]
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        Self {
            doc: RwLock::new(SessionDocument {
                access_token: Some(access_token.to_owned()),
                refresh_token: Some(refresh_token.to_owned()),
                user: None,
            }),
        }
    }

    /// Create a store holding only an access token (no refresh credential).
    #[must_use]
    pub fn with_access_token(access_token: &str) -> Self {
        Self {
            doc: RwLock::new(SessionDocument {
                access_token: Some(access_token.to_owned()),
                refresh_token: None,
                user: None,
            }),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn access_token(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.doc.read().await.access_token.clone())
    }

    async fn refresh_token(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.doc.read().await.refresh_token.clone())
    }

    async fn profile(&self) -> Result<Option<UserProfile>, SessionStoreError> {
        Ok(self.doc.read().await.user.clone())
    }

    async fn store_tokens(&self, tokens: &SessionTokens) -> Result<(), SessionStoreError> {
        let mut doc = self.doc.write().await;
        doc.access_token = Some(tokens.access_token.clone());
        doc.refresh_token = Some(tokens.refresh_token.clone());
        Ok(())
    }

    async fn store_profile(&self, profile: &UserProfile) -> Result<(), SessionStoreError> {
        self.doc.write().await.user = Some(profile.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        *self.doc.write().await = SessionDocument::default();
        Ok(())
    }
}

// =============================================================================
// FileSessionStore
// =============================================================================

/// File-backed session store.
///
/// Every operation reads the document from disk and writes it back through a
/// temp-file rename, so a crash never leaves a half-written session. A
/// missing file is an empty session; `clear` removes the file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store backed by the given path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_document(&self) -> Result<SessionDocument, SessionStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(SessionDocument::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, doc: &SessionDocument) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(doc)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn access_token(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.read_document().await?.access_token)
    }

    async fn refresh_token(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.read_document().await?.refresh_token)
    }

    async fn profile(&self) -> Result<Option<UserProfile>, SessionStoreError> {
        Ok(self.read_document().await?.user)
    }

    async fn store_tokens(&self, tokens: &SessionTokens) -> Result<(), SessionStoreError> {
        let mut doc = self.read_document().await?;
        doc.access_token = Some(tokens.access_token.clone());
        doc.refresh_token = Some(tokens.refresh_token.clone());
        self.write_document(&doc).await
    }

    async fn store_profile(&self, profile: &UserProfile) -> Result<(), SessionStoreError> {
        let mut doc = self.read_document().await?;
        doc.user = Some(profile.clone());
        self.write_document(&doc).await
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use madina_core::{Role, UserId};

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("u1"),
            name: "Test User".to_owned(),
            email: "user@example.com".parse().unwrap(),
            phone: None,
            role: Role::Customer,
        }
    }

    fn tokens() -> SessionTokens {
        SessionTokens {
            access_token: "A1".to_owned(),
            refresh_token: "R1".to_owned(),
        }
    }

    #[test]
    fn test_tokens_debug_is_redacted() {
        let output = format!("{:?}", tokens());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("A1"));
        assert!(!output.contains("R1"));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.access_token().await.unwrap().is_none());

        store.store_tokens(&tokens()).await.unwrap();
        store.store_profile(&profile()).await.unwrap();

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R1"));
        assert!(store.profile().await.unwrap().is_some());

        store.clear().await.unwrap();
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(path.clone());

        store.store_tokens(&tokens()).await.unwrap();
        store.store_profile(&profile()).await.unwrap();

        // A second store over the same path sees the same session.
        let reopened = FileSessionStore::new(path.clone());
        assert_eq!(
            reopened.access_token().await.unwrap().as_deref(),
            Some("A1")
        );

        // Document uses the well-known storage keys.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("accessToken"));
        assert!(raw.contains("refreshToken"));
        assert!(raw.contains("user"));

        store.clear().await.unwrap();
        assert!(!path.exists());
        assert!(reopened.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent.json"));
        assert!(store.access_token().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(path);
        assert!(matches!(
            store.access_token().await,
            Err(SessionStoreError::Corrupt(_))
        ));
    }
}
