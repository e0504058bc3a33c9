#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::post,
};
use chatbot_frontend::{
    error::Result,
    message::{ChatRequest, Credentials},
    error::ClientError,
    services::{
        gateway::{ApiRequest, ApiResponse, Transport},
        session_store::Session,
        storage::{MemoryStorage, PersistedSession, SessionStorage},
    },
    state::AppState,
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Transport double: records every request and replays queued responses,
/// falling back to `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Result<ApiResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::json(reqwest::StatusCode::OK, json!({}))))
    }
}

/// Storage over a `MemoryStorage` that can stall or fail its writes.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    pub save_delay: std::time::Duration,
    pub fail_save: bool,
    pub fail_clear: bool,
}

impl FlakyStorage {
    pub fn over(inner: MemoryStorage) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SessionStorage for FlakyStorage {
    async fn load(&self) -> Option<PersistedSession> {
        self.inner.load().await
    }

    async fn save(&self, session: &Session) -> Result<()> {
        tokio::time::sleep(self.save_delay).await;
        if self.fail_save {
            return Err(ClientError::Storage("disk full".to_string()));
        }
        self.inner.save(session).await
    }

    async fn clear(&self) -> Result<()> {
        if self.fail_clear {
            return Err(ClientError::Storage("permission denied".to_string()));
        }
        self.inner.clear().await
    }
}

/// In-process stand-in for the chat/auth API.
#[derive(Clone, Default)]
pub struct MockApi {
    users: Arc<Mutex<HashMap<String, String>>>,
    pub seen_auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockApi {
    pub fn with_user(username: &str, password: &str) -> Self {
        let api = Self::default();
        api.users
            .lock()
            .unwrap()
            .insert(username.to_string(), password.to_string());
        api
    }

    pub fn token_for(username: &str) -> String {
        format!("token-{username}")
    }

    fn router(self) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/chat", post(chat))
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }
}

/// Serve `api` on an ephemeral port and return its base URL.
pub async fn spawn_api(api: MockApi) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api.router()).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub async fn app_state(storage: Arc<dyn SessionStorage>, base_url: &str) -> AppState {
    let transport = chatbot_frontend::services::gateway::HttpTransport::new(
        base_url,
        std::time::Duration::from_secs(5),
    )
    .unwrap();
    AppState::new(storage, Arc::new(transport)).await
}

fn detail(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

async fn register(
    State(api): State<MockApi>,
    Json(creds): Json<Credentials>,
) -> (StatusCode, Json<Value>) {
    let mut users = api.users.lock().unwrap();
    if users.contains_key(&creds.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    users.insert(creds.username, creds.password);
    (StatusCode::OK, Json(json!({ "msg": "User created" })))
}

async fn login(
    State(api): State<MockApi>,
    Json(creds): Json<Credentials>,
) -> (StatusCode, Json<Value>) {
    let users = api.users.lock().unwrap();
    match users.get(&creds.username) {
        Some(password) if *password == creds.password => (
            StatusCode::OK,
            Json(json!({
                "access_token": MockApi::token_for(&creds.username),
                "token_type": "bearer",
                "role": "user",
            })),
        ),
        _ => detail(StatusCode::BAD_REQUEST, "Invalid credentials"),
    }
}

async fn chat(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    api.seen_auth.lock().unwrap().push(auth.clone());

    let authorized = {
        let users = api.users.lock().unwrap();
        auth.as_deref()
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| users.keys().any(|u| MockApi::token_for(u) == token))
    };
    if !authorized {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    if req.message.trim().is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Message cannot be empty");
    }
    (StatusCode::OK, Json(json!({ "reply": format!("echo: {}", req.message) })))
}
