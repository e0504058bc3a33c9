// src/routes/register.rs
use tracing::info;

use crate::{
    error::Result,
    message::Credentials,
    routes::{Route, form_error, login::sign_in, require_filled},
    state::AppState,
};

pub const REGISTER_FAILED: &str = "Registration failed";

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
    pub loading: bool,
}

impl RegisterForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Create the account, then sign straight in with the same credentials.
    pub async fn submit(&mut self, state: &AppState) -> Result<Route> {
        self.error = None;
        let fields = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        if let Err(e) = require_filled(&fields) {
            self.error = Some(e.user_message(REGISTER_FAILED));
            return Err(e);
        }

        let credentials = Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };

        self.loading = true;
        let result = register_and_sign_in(state, &credentials).await;
        self.loading = false;

        result.inspect_err(|e| self.error = Some(form_error(e, REGISTER_FAILED)))
    }
}

async fn register_and_sign_in(state: &AppState, credentials: &Credentials) -> Result<Route> {
    let _: serde_json::Value = state.gateway.post("/register", credentials).await?;
    info!(username = %credentials.username, "registered");
    sign_in(state, credentials).await
}
