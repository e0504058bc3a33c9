// src/services/gateway.rs
//! Single point of outbound HTTP traffic.
//!
//! Every call runs the same pipeline: [`Gateway::prepare`] attaches the
//! bearer token, a [`Transport`] performs the exchange, and
//! [`Gateway::handle_response`] turns non-2xx statuses into errors and tears
//! the session down on 401.

use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Method, StatusCode, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::message::ErrorBody;
use crate::routes::{Navigator, Route};
use crate::services::session_store::SessionStore;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
        }
    }
}

/// Performs a prepared request. Network failures are `ClientError::Transport`;
/// any HTTP status, including errors, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid API base URL {base_url:?}: {e}")))?;
        // `Url::join` replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| ClientError::Validation(format!("invalid path {:?}: {e}", request.path)))?;

        let mut builder = self.client.request(request.method, url).headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    navigator: Navigator,
}

impl Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore, navigator: Navigator) -> Self {
        Self {
            transport,
            session,
            navigator,
        }
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let request = self.prepare(method, path, body).await;
        let (method, path) = (request.method.clone(), request.path.clone());

        let response = self.transport.send(request).await.inspect_err(|e| {
            warn!(%method, %path, error = %e, "request failed");
        })?;
        debug!(%method, %path, status = response.status.as_u16(), "response received");

        let response = self.handle_response(response).await?;
        decode_body(&response.body)
    }

    /// Outgoing stage: attach `Authorization: Bearer <token>` when a token is
    /// held. Never fails; an unusable token just means no header.
    pub async fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiRequest {
        let mut request = ApiRequest::new(method, path);
        request.body = body;

        if let Some(token) = self.session.token().await {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    request.headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("stored token is not a valid header value; sending without it"),
            }
        }
        request
    }

    /// Incoming stage: 2xx passes through untouched. A 401 clears the session
    /// and sends the user to the login view before the error is returned.
    pub async fn handle_response(&self, response: ApiResponse) -> Result<ApiResponse> {
        if response.status.is_success() {
            return Ok(response);
        }

        let detail = ErrorBody::parse_detail(&response.body);

        if response.status == StatusCode::UNAUTHORIZED {
            warn!("authentication rejected; clearing session");
            // Teardown failures are logged by the store; the 401 still wins.
            let _ = self.session.invalidate().await;
            self.navigator.navigate(Route::Login).await;
        }

        Err(ClientError::Http {
            status: response.status.as_u16(),
            detail,
        })
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    Ok(serde_json::from_slice(body)?)
}
