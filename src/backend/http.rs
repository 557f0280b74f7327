//! HTTP implementation of the chat backend

use super::types::{ChatReply, ChatRequest, ErrorBody, HistoryMessage, SessionSummary};
use super::{BackendError, ChatBackend};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Talks to the Library Desk agent over its JSON API
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// `timeout` of `None` means requests may hang indefinitely; the UI then
    /// stays pending until the server answers.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::transport(format!("Invalid API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::transport(format!(
                "API URL cannot be a base: {base_url}"
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::transport("API URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::decode(format!("Unexpected response body: {e}")))
    }
}

/// Build the error for a non-2xx answer, pulling `detail` out of the body
fn classify_error(status: u16, body: &str) -> BackendError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::detail_text);
    BackendError::status(status, detail)
}

fn transport_error(err: &reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::transport(format!("Request timed out: {err}"))
    } else {
        BackendError::transport(format!("Network error: {err}"))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_turn(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let url = self.endpoint(&["api", "chat"])?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        Self::read_json(response).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        let url = self.endpoint(&["api", "sessions"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        Self::read_json(response).await
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryMessage>, BackendError> {
        let url = self.endpoint(&["api", "sessions", session_id, "messages"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        Self::read_json(response).await
    }

    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}
