// src/services/session_store.rs
use std::{fmt::Debug, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::error::Result;
use crate::services::storage::SessionStorage;

/// Authentication state. `role` only means something while `token` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn normalized(self) -> Self {
        if self.is_authenticated() {
            self
        } else {
            Session::default()
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Session>>,
    storage: Arc<dyn SessionStorage>,
    /// Held from the memory update until the storage write lands, so the
    /// persisted entry always matches the last mutation.
    write_lock: Arc<Mutex<()>>,
}

impl Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Empty store on top of `storage`. Nothing is read.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_session(Session::default(), storage)
    }

    /// Restore whatever `storage` holds. Absent or malformed entries give an
    /// empty session.
    pub async fn load(storage: Arc<dyn SessionStorage>) -> Self {
        let session = storage
            .load()
            .await
            .map(|entry| entry.state.normalized())
            .unwrap_or_default();
        if session.is_authenticated() {
            info!(role = ?session.role, "restored persisted session");
        }
        Self::with_session(session, storage)
    }

    fn with_session(session: Session, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Set token and role unconditionally, then persist. A failed write is
    /// returned as `ClientError::Storage`; memory keeps the new session.
    pub async fn login(&self, token: impl Into<String>, role: impl Into<String>) -> Result<()> {
        let _write = self.write_lock.lock().await;
        let snapshot = {
            let mut guard = self.inner.write().await;
            guard.token = Some(token.into());
            guard.role = Some(role.into());
            guard.clone()
        };
        self.persist(&snapshot).await
    }

    /// Clear both fields and persist the cleared state.
    pub async fn logout(&self) -> Result<()> {
        let _write = self.write_lock.lock().await;
        *self.inner.write().await = Session::default();
        self.persist(&Session::default()).await
    }

    /// Clear memory and drop the persisted entry altogether. If the entry
    /// cannot be removed it is overwritten with an empty session instead.
    pub async fn invalidate(&self) -> Result<()> {
        let _write = self.write_lock.lock().await;
        *self.inner.write().await = Session::default();

        let Err(e) = self.storage.clear().await else {
            return Ok(());
        };
        warn!(error = %e, "failed to remove persisted session; overwriting it");
        self.persist(&Session::default()).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    pub async fn token(&self) -> Option<String> {
        let guard = self.inner.read().await;
        guard.token.clone().filter(|t| !t.is_empty())
    }

    pub async fn role(&self) -> Option<String> {
        let guard = self.inner.read().await;
        if guard.is_authenticated() {
            guard.role.clone()
        } else {
            None
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    async fn persist(&self, session: &Session) -> Result<()> {
        self.storage.save(session).await.inspect_err(|e| {
            warn!(error = %e, "failed to persist session");
        })
    }
}
