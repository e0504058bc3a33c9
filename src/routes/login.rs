// src/routes/login.rs
use tracing::info;

use crate::{
    error::Result,
    message::{Credentials, LoginResponse},
    routes::{Route, form_error, require_filled},
    state::AppState,
};

pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            error: None,
        }
    }

    /// On success the session holds the new token and the view is chat. On
    /// failure only `error` changes, except for `ClientError::Storage`: the
    /// user is signed in and on chat, but the session was not persisted.
    pub async fn submit(&mut self, state: &AppState) -> Result<Route> {
        self.error = None;
        let fields = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        let result = match require_filled(&fields) {
            Ok(()) => sign_in(state, &self.credentials()).await,
            Err(e) => Err(e),
        };
        result.inspect_err(|e| self.error = Some(form_error(e, LOGIN_FAILED)))
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// `POST /login`, store the token, go to chat. Shared with registration.
pub(crate) async fn sign_in(state: &AppState, credentials: &Credentials) -> Result<Route> {
    let resp: LoginResponse = state.gateway.post("/login", credentials).await?;

    // A failed write still leaves a usable in-memory session, so the view
    // moves on and the storage error is reported afterwards.
    let saved = state.session.login(resp.access_token, resp.role).await;
    info!(username = %credentials.username, persisted = saved.is_ok(), "signed in");

    state.navigator.navigate(Route::Chat).await;
    saved.map(|()| Route::Chat)
}
