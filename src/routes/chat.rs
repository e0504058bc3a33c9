// src/routes/chat.rs
use tracing::{debug, warn};

use crate::{
    error::Result,
    message::{ChatRequest, ChatResponse},
    routes::Route,
    services::message_store::ChatMessage,
    state::AppState,
};

pub const CHAT_FAILED: &str = "Sorry, failed to generate a reply. Please try again.";

#[derive(Debug, Clone, Default)]
pub struct ChatView {
    pub input: String,
    /// Set while a `/chat` request is outstanding; blocks resubmission.
    pub awaiting_reply: bool,
    pub error: Option<String>,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_send(&self) -> bool {
        !self.awaiting_reply && !self.input.trim().is_empty()
    }

    /// Post the current input. Returns the AI reply, or `None` when there was
    /// nothing to send or a reply is still pending.
    pub async fn send(&mut self, state: &AppState) -> Result<Option<ChatMessage>> {
        let Some(content) = self.begin(state).await else {
            return Ok(None);
        };
        let result = post_message(state, content).await;
        self.complete(state, result).await.map(Some)
    }

    /// First half of [`send`](Self::send): append the user message and raise
    /// `awaiting_reply`. Returns the text to post, or `None` if nothing may be
    /// sent right now.
    pub async fn begin(&mut self, state: &AppState) -> Option<String> {
        if !self.can_send() {
            return None;
        }
        let content = std::mem::take(&mut self.input);
        state.messages.add_message(ChatMessage::user(content.clone())).await;
        self.awaiting_reply = true;
        self.error = None;
        Some(content)
    }

    /// Second half of [`send`](Self::send): lower `awaiting_reply` and record
    /// the reply or the error text.
    pub async fn complete(
        &mut self,
        state: &AppState,
        result: Result<ChatResponse>,
    ) -> Result<ChatMessage> {
        self.awaiting_reply = false;
        match result {
            Ok(resp) => {
                let reply = ChatMessage::ai(resp.reply);
                let len = state.messages.add_message(reply.clone()).await;
                debug!(messages = len, "reply received");
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                self.error = Some(e.user_message(CHAT_FAILED));
                Err(e)
            }
        }
    }

    pub async fn clear(&mut self, state: &AppState) {
        state.messages.clear_messages().await;
        self.input.clear();
        self.error = None;
    }

    pub async fn logout(&mut self, state: &AppState) -> Result<Route> {
        let result = state.session.logout().await;
        state.navigator.navigate(Route::Login).await;
        result.map(|()| Route::Login)
    }
}

/// `POST /chat` with one message.
pub async fn post_message(state: &AppState, message: String) -> Result<ChatResponse> {
    state.gateway.post("/chat", &ChatRequest { message }).await
}
