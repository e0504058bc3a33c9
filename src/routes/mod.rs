// src/routes/mod.rs
pub mod chat;
pub mod login;
pub mod register;

use std::{fmt, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::services::session_store::SessionStore;

pub use chat::ChatView;
pub use login::LoginForm;
pub use register::RegisterForm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Chat,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Chat => "/chat",
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Chat)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Shared handle on the current view. Cloning shares the same location.
#[derive(Clone, Debug)]
pub struct Navigator {
    current: Arc<RwLock<Route>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
        }
    }

    /// Start on the chat view when a restored session is authenticated.
    pub async fn for_session(session: &SessionStore) -> Self {
        Self::new(resolve(Route::Chat, session).await)
    }

    pub async fn navigate(&self, route: Route) {
        let mut guard = self.current.write().await;
        let from = *guard;
        if from != route {
            debug!(%from, to = %route, "navigate");
        }
        *guard = route;
    }

    pub async fn current(&self) -> Route {
        *self.current.read().await
    }
}

/// Gate a route on authentication: protected routes fall back to login.
pub async fn resolve(route: Route, session: &SessionStore) -> Route {
    if route.requires_auth() && !session.is_authenticated().await {
        Route::Login
    } else {
        route
    }
}

pub const SESSION_NOT_SAVED: &str =
    "Signed in, but the session could not be saved and will not survive a restart";

/// Inline text for a failed form submission.
pub(crate) fn form_error(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Storage(_) => SESSION_NOT_SAVED.to_string(),
        other => other.user_message(fallback),
    }
}

/// Reject whitespace-only input before anything is sent.
pub(crate) fn require_filled(fields: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(format!(
            "Please enter {}",
            missing.join(" and ")
        )))
    }
}
