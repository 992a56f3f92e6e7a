use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// The token pair representing an authenticated session.
///
/// The access token is short-lived and attached to every request; the
/// refresh token is used solely to mint a new access token after the
/// backend rejects the current one with a 401.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl SessionTokens {
    pub fn new(access: String, refresh: String, username: String) -> Self {
        Self {
            access,
            refresh,
            username,
            created_at: Utc::now(),
        }
    }
}

/// Durable store for the session token pair.
///
/// The pair lives behind a read/write lock: any in-flight request reads
/// the access token, while only login and the refresh path write. The
/// store makes no attempt to coordinate concurrent refreshes - if two
/// requests both hit a 401 and both refresh, the last write wins.
pub struct SessionStore {
    cache_dir: PathBuf,
    data: RwLock<Option<SessionTokens>>,
}

impl SessionStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: RwLock::new(None),
        }
    }

    /// Load a persisted session from disk. Returns true if one was found.
    pub async fn load(&self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let tokens: SessionTokens =
                serde_json::from_str(&contents).context("Failed to parse session file")?;
            debug!(username = %tokens.username, "Loaded persisted session");
            *self.data.write().await = Some(tokens);
            return Ok(true);
        }
        Ok(false)
    }

    /// Replace the session with a freshly issued token pair and persist it.
    pub async fn set(&self, tokens: SessionTokens) -> Result<()> {
        let mut guard = self.data.write().await;
        *guard = Some(tokens);
        self.save(guard.as_ref())
    }

    /// Overwrite only the access token, keeping the refresh token.
    ///
    /// This is the refresh path: the backend returns a new access token
    /// but the refresh token stays valid. No-op if no session exists.
    pub async fn set_access(&self, access: String) -> Result<()> {
        let mut guard = self.data.write().await;
        if let Some(tokens) = guard.as_mut() {
            tokens.access = access;
        }
        self.save(guard.as_ref())
    }

    /// Delete the session, both in memory and on disk.
    pub async fn clear(&self) -> Result<()> {
        *self.data.write().await = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    /// Current access token, if a session exists.
    pub async fn access(&self) -> Option<String> {
        self.data.read().await.as_ref().map(|t| t.access.clone())
    }

    /// Current refresh token, if a session exists.
    pub async fn refresh_token(&self) -> Option<String> {
        self.data.read().await.as_ref().map(|t| t.refresh.clone())
    }

    /// Username the session was created for, if a session exists.
    pub async fn username(&self) -> Option<String> {
        self.data.read().await.as_ref().map(|t| t.username.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.data.read().await.is_some()
    }

    fn save(&self, tokens: Option<&SessionTokens>) -> Result<()> {
        let path = self.session_path();
        if let Some(tokens) = tokens {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(tokens)?;
            std::fs::write(path, contents).context("Failed to write session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(access: &str, refresh: &str) -> SessionTokens {
        SessionTokens::new(access.to_string(), refresh.to_string(), "alice".to_string())
    }

    #[tokio::test]
    async fn test_set_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        store.set(tokens("A1", "R1")).await.unwrap();
        assert_eq!(store.access().await.as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("R1"));
        assert_eq!(store.username().await.as_deref(), Some("alice"));
        assert!(store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SessionStore::new(dir.path().to_path_buf());
            store.set(tokens("A1", "R1")).await.unwrap();
        }

        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(store.load().await.unwrap());
        assert_eq!(store.access().await.as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_load_without_file_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(!store.load().await.unwrap());
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_set_access_keeps_refresh_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        store.set(tokens("A1", "R1")).await.unwrap();
        store.set_access("A2".to_string()).await.unwrap();

        assert_eq!(store.access().await.as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("R1"));

        // The overwrite must be durable too
        let reloaded = SessionStore::new(dir.path().to_path_buf());
        assert!(reloaded.load().await.unwrap());
        assert_eq!(reloaded.access().await.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_set_access_without_session_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());
        store.set_access("A2".to_string()).await.unwrap();
        assert_eq!(store.access().await, None);
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        store.set(tokens("A1", "R1")).await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.is_authenticated().await);
        assert!(!dir.path().join("session.json").exists());

        let reloaded = SessionStore::new(dir.path().to_path_buf());
        assert!(!reloaded.load().await.unwrap());
    }
}
