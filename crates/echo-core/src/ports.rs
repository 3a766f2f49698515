//! Port traits at the boundary to the platform adapters.
//!
//! These traits are defined here in `echo-core` (pure Rust).
//! Implementations live in `echo-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use echo_types::{
    Result,
    message::{ChatMessage, PostMessageReply, PostMessageRequest},
    search::{SemanticSearchRequest, SemanticSearchResponse},
    session::{Session, SessionId},
};

// ─── API Port ────────────────────────────────────────────────

/// The EchoPrompt REST backend. The single place transport errors surface.
#[async_trait(?Send)]
pub trait ApiPort {
    /// `GET /sessions`
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    /// `GET /sessions/{id}`
    async fn get_session(&self, id: SessionId) -> Result<Session>;

    /// `POST /sessions`
    async fn create_session(&self, name: &str) -> Result<Session>;

    /// `DELETE /sessions/{id}`; a missing session counts as deleted
    async fn delete_session(&self, id: SessionId) -> Result<()>;

    /// `GET /sessions/{id}/messages`
    async fn list_messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>>;

    /// `POST /sessions/{id}/messages`
    async fn post_message(
        &self,
        session_id: SessionId,
        req: PostMessageRequest,
    ) -> Result<PostMessageReply>;

    /// `POST /query/semantic_search`
    async fn semantic_search(&self, req: SemanticSearchRequest) -> Result<SemanticSearchResponse>;

    /// `GET /health`
    async fn health(&self) -> Result<()>;
}

// ─── Timer Port ──────────────────────────────────────────────

#[async_trait(?Send)]
pub trait TimerPort {
    /// Suspend the current task without blocking the event loop
    async fn sleep(&self, ms: u32);

    /// Client wall clock in epoch milliseconds
    fn now_ms(&self) -> i64;
}
