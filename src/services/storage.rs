// src/services/storage.rs
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::services::session_store::Session;

pub const STORAGE_VERSION: u32 = 1;
pub const STORAGE_FILE_NAME: &str = "auth-storage.json";

/// On-disk shape of the session entry: `{"version": 1, "state": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub state: Session,
}

impl PersistedSession {
    pub fn current(session: &Session) -> Self {
        Self {
            version: STORAGE_VERSION,
            state: session.clone(),
        }
    }

    /// Parse a raw entry. Returns `None` for anything malformed.
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str::<PersistedSession>(raw) {
            Ok(entry) => {
                if entry.version > STORAGE_VERSION {
                    warn!(
                        version = entry.version,
                        "session entry written by a newer client; reading known fields only"
                    );
                }
                Some(entry)
            }
            Err(e) => {
                warn!(error = %e, "ignoring malformed session entry");
                None
            }
        }
    }
}

/// Durable home of the single session entry.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Absent or unreadable entries load as `None`.
    async fn load(&self) -> Option<PersistedSession>;
    async fn save(&self, session: &Session) -> Result<()>;
    /// Remove the entry entirely.
    async fn clear(&self) -> Result<()>;
}

/// One JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self) -> Option<PersistedSession> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => PersistedSession::decode(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted session");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read persisted session");
                None
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(&PersistedSession::current(session))?;

        // Write then rename so a crash mid-write never leaves a torn entry.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the raw entry in memory. Used for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    raw: Arc<RwLock<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a raw entry, well-formed or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Arc::new(RwLock::new(Some(raw.into()))),
        }
    }

    pub async fn raw(&self) -> Option<String> {
        self.raw.read().await.clone()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Option<PersistedSession> {
        let guard = self.raw.read().await;
        guard.as_deref().and_then(PersistedSession::decode)
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(&PersistedSession::current(session))?;
        *self.raw.write().await = Some(json);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.raw.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_tolerates_missing_and_extra_fields() {
        let entry = PersistedSession::decode(
            r#"{"version": 1, "state": {"token": "abc", "theme": "dark"}, "extra": true}"#,
        )
        .unwrap();
        assert_eq!(entry.state.token.as_deref(), Some("abc"));
        assert_eq!(entry.state.role, None);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(PersistedSession::decode("not json").is_none());
        assert!(PersistedSession::decode(r#"{"state": "abc"}"#).is_none());
    }

    #[test]
    fn newer_version_is_still_read() {
        let entry =
            PersistedSession::decode(r#"{"version": 7, "state": {"token": "t", "role": "user"}}"#)
                .unwrap();
        assert_eq!(entry.version, 7);
        assert_eq!(entry.state.role.as_deref(), Some("user"));
    }

    #[tokio::test]
    async fn memory_storage_save_and_clear() {
        let storage = MemoryStorage::new();
        assert!(storage.load().await.is_none());

        let session = Session {
            token: Some("abc".to_string()),
            role: Some("user".to_string()),
        };
        storage.save(&session).await.unwrap();
        let raw = storage.raw().await.unwrap();
        assert!(raw.contains("\"version\":1"));
        assert_eq!(storage.load().await.unwrap().state, session);

        storage.clear().await.unwrap();
        assert!(storage.raw().await.is_none());
    }
}
