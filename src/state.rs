// src/state.rs
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::routes::Navigator;
use crate::services::{
    gateway::{Gateway, HttpTransport, Transport},
    message_store::MessageStore,
    session_store::SessionStore,
    storage::{FileStorage, SessionStorage},
};

/// Everything the views share. Handles are cheap clones over the same state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub session: SessionStore,
    pub messages: MessageStore,
    pub navigator: Navigator,
    pub gateway: Gateway,
}

impl AppState {
    /// Restore the persisted session, then pick the first view from it.
    pub async fn new(storage: Arc<dyn SessionStorage>, transport: Arc<dyn Transport>) -> Self {
        let session = SessionStore::load(storage).await;
        let navigator = Navigator::for_session(&session).await;
        let gateway = Gateway::new(transport, session.clone(), navigator.clone());
        Self {
            session,
            messages: MessageStore::new(),
            navigator,
            gateway,
        }
    }

    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.session_path));
        let transport = Arc::new(HttpTransport::new(&config.base_url, config.request_timeout)?);
        Ok(Self::new(storage, transport).await)
    }
}
