// src/config.rs
use std::{path::PathBuf, time::Duration};

use crate::error::{ClientError, Result};
use crate::services::storage::STORAGE_FILE_NAME;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_path: PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Read `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = value("CHAT_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("CHAT_API_BASE_URL {base_url:?}: {e}")))?;

        let session_path = match value("CHAT_SESSION_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_session_path(),
        };

        let request_timeout = match value("CHAT_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    ClientError::Config(format!(
                        "CHAT_REQUEST_TIMEOUT_SECS must be a number, got {raw:?}"
                    ))
                })?;
                if secs == 0 {
                    return Err(ClientError::Config(
                        "CHAT_REQUEST_TIMEOUT_SECS must be positive".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url,
            session_path,
            request_timeout,
        })
    }
}

/// `<config dir>/chatbot-frontend/auth-storage.json`, or the working
/// directory when the platform has no config dir.
pub fn default_session_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("chatbot-frontend"))
        .unwrap_or_default()
        .join(STORAGE_FILE_NAME)
}
