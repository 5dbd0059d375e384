//! Guest session
//!
//! The access token is the only mutable state shared between components.
//! [`Session`] is handed to each service at construction and mediates every
//! read, write and delete of it. Writes are last-writer-wins; a single guest
//! drives one authentication at a time, so no further coordination is done.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::TOKEN_STORAGE_KEY;
use crate::error::BookingError;

/// Client-side storage for the access token
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, BookingError>;

    async fn save(&self, token: &str) -> Result<(), BookingError>;

    async fn clear(&self) -> Result<(), BookingError>;
}

/// Token held for the lifetime of the process
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, BookingError> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> Result<(), BookingError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), BookingError> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// Token persisted in a small JSON file under [`TOKEN_STORAGE_KEY`]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, BookingError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => match serde_json::from_slice::<Value>(&raw) {
                Ok(Value::Object(entries)) => Ok(entries),
                Ok(_) | Err(_) => {
                    warn!("Ignoring unreadable session file {}", self.path.display());
                    Ok(Map::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: Map<String, Value>) -> Result<(), BookingError> {
        if entries.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        let raw = serde_json::to_vec_pretty(&Value::Object(entries))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, BookingError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn save(&self, token: &str) -> Result<(), BookingError> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(entries).await
    }

    async fn clear(&self) -> Result<(), BookingError> {
        let mut entries = self.read_entries().await?;
        if entries.remove(TOKEN_STORAGE_KEY).is_some() {
            self.write_entries(entries).await?;
        }
        Ok(())
    }
}

/// Shared handle on the guest's access token
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileTokenStore::new(path)))
    }

    pub async fn token(&self) -> Result<Option<String>, BookingError> {
        self.store.load().await
    }

    /// Token for a protected call, or an auth error if the guest has none
    pub async fn require_token(&self) -> Result<String, BookingError> {
        self.token().await?.ok_or_else(|| {
            BookingError::auth_with_fallback(
                "Authentication required. Please access your booking via the email link or your booking reference.",
            )
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.token().await, Ok(Some(_)))
    }

    pub async fn store_token(&self, token: &str) -> Result<(), BookingError> {
        self.store.save(token).await?;
        debug!("Booking access token stored");
        Ok(())
    }

    /// Logout; also used whenever a protected call comes back 401
    pub async fn clear(&self) -> Result<(), BookingError> {
        self.store.clear().await?;
        info!("Booking access token cleared");
        Ok(())
    }

    /// Drops the token when `result` says it is no longer accepted
    pub async fn guard<T>(&self, result: Result<T, BookingError>) -> Result<T, BookingError> {
        if let Err(e) = &result {
            if e.invalidates_session() {
                warn!("Access token rejected by server: {}", e);
                if let Err(clear_err) = self.clear().await {
                    warn!("Failed to clear access token: {}", clear_err);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_session_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "hotel-booking-{}-{}.json",
            name,
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn test_memory_session_lifecycle() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated().await);

        session.store_token("tok-1").await.unwrap();
        assert!(session.is_authenticated().await);
        assert_eq!(session.require_token().await.unwrap(), "tok-1");

        session.clear().await.unwrap();
        assert!(!session.is_authenticated().await);
        assert!(session.require_token().await.is_err());
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let session = Session::in_memory();
        let other = session.clone();

        session.store_token("first").await.unwrap();
        other.store_token("second").await.unwrap();

        assert_eq!(session.token().await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_guard_clears_on_auth_error() {
        let session = Session::in_memory();
        session.store_token("tok-1").await.unwrap();

        let result: Result<(), _> = session
            .guard(Err(BookingError::auth_with_fallback("expired")))
            .await;
        assert!(result.is_err());
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_guard_keeps_token_on_other_errors() {
        let session = Session::in_memory();
        session.store_token("tok-1").await.unwrap();

        let _ = session
            .guard::<()>(Err(BookingError::RateLimited("wait".to_string())))
            .await;
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_file_store_persists_under_fixed_key() {
        let path = temp_session_file("persist");
        let store = FileTokenStore::new(&path);
        store.clear().await.unwrap();

        store.save("tok-file").await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[TOKEN_STORAGE_KEY], "tok-file");

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load().await.unwrap().as_deref(), Some("tok-file"));

        reopened.clear().await.unwrap();
        assert!(reopened.load().await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_file() {
        let store = FileTokenStore::new(temp_session_file("missing"));
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }
}
