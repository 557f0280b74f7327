//! Backend error types

use thiserror::Error;

/// Shown when a failed send carries no usable `detail`
pub const GENERIC_SEND_FAILURE: &str = "Failed to send message";

/// Backend error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    /// HTTP status, when the server answered at all
    pub status: Option<u16>,
    /// User-facing description (the server's `detail` when it sent one)
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Non-2xx answer. `detail` comes from the `{ "detail": ... }` body when
    /// it could be parsed.
    pub fn status(status: u16, detail: Option<String>) -> Self {
        let message = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SEND_FAILURE.to_string());
        Self::new(BackendErrorKind::Status, message).with_status(status)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Decode, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// Where a request went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Server answered with a non-success status
    Status,
    /// Connection refused, reset, timed out
    Transport,
    /// Success status but the body did not match the contract
    Decode,
}
