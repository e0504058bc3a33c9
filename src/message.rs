// src/message.rs
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Error body the API returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Extract a human-readable `detail`. Structured details (validation
    /// arrays) are not shown to the user.
    pub fn parse_detail(body: &[u8]) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("alice"));
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn detail_string_is_extracted() {
        let body = br#"{"detail": "Username already registered"}"#;
        assert_eq!(
            ErrorBody::parse_detail(body).as_deref(),
            Some("Username already registered")
        );
    }

    #[test]
    fn structured_or_missing_detail_is_ignored() {
        assert_eq!(ErrorBody::parse_detail(br#"{"detail": [{"loc": ["body"]}]}"#), None);
        assert_eq!(ErrorBody::parse_detail(br#"{"msg": "nope"}"#), None);
        assert_eq!(ErrorBody::parse_detail(b"<html>bad gateway</html>"), None);
    }

    #[test]
    fn login_response_tolerates_extra_fields() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"access_token": "abc", "token_type": "bearer", "role": "admin", "exp": 1}"#,
        )
        .unwrap();
        assert_eq!(resp.access_token, "abc");
        assert_eq!(resp.role, "admin");
    }
}
