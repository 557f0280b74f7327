//! Chat agent backend
//!
//! Typed access to the three endpoints the client depends on: send a turn,
//! list sessions, fetch a session's history.

mod error;
mod http;
mod types;

pub use error::BackendError;
#[cfg(test)]
pub use error::BackendErrorKind;
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the chat agent backend
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST /api/chat`
    async fn send_turn(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    /// `GET /api/sessions`, in server order
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError>;

    /// `GET /api/sessions/{id}/messages`, in server order
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryMessage>, BackendError>;

    /// Where requests go (for logging)
    fn base_url(&self) -> &str;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn send_turn(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        (**self).send_turn(request).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        (**self).list_sessions().await
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryMessage>, BackendError> {
        (**self).fetch_history(session_id).await
    }

    fn base_url(&self) -> &str {
        (**self).base_url()
    }
}

/// Logging wrapper for backends
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: ChatBackend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(
    endpoint: &'static str,
    started: std::time::Instant,
    result: &Result<T, BackendError>,
) {
    let duration = started.elapsed();
    match result {
        Ok(_) => {
            tracing::info!(
                endpoint,
                duration_ms = %duration.as_millis(),
                "Backend request completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                endpoint,
                duration_ms = %duration.as_millis(),
                status = ?e.status,
                kind = ?e.kind,
                error = %e.message,
                "Backend request failed"
            );
        }
    }
}

#[async_trait]
impl<B: ChatBackend> ChatBackend for LoggingBackend<B> {
    async fn send_turn(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_turn(request).await;
        log_outcome("chat", start, &result);
        if let Ok(reply) = &result {
            tracing::debug!(
                session_id = %reply.session_id,
                tool_calls = reply.tool_calls.len(),
                has_text = reply.reply_text().is_some(),
                "Chat reply received"
            );
        }
        result
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.list_sessions().await;
        log_outcome("sessions", start, &result);
        result
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryMessage>, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.fetch_history(session_id).await;
        log_outcome("messages", start, &result);
        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
