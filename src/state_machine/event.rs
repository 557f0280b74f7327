//! Events that can occur in a conversation

use crate::backend::{BackendError, ChatReply, HistoryMessage, SessionSummary};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// Enter pressed in the input surface
    UserSubmit { text: String },
    /// "New conversation" action
    NewConversation,
    /// A directory entry was opened; the id is bound to the entry
    SelectSession { session_id: String },
    /// Startup or explicit reload of the session list
    RefreshSessions,

    // Backend events
    SendSucceeded { reply: ChatReply },
    SendFailed { error: BackendError },
    HistoryLoaded {
        session_id: String,
        epoch: u64,
        messages: Vec<HistoryMessage>,
    },
    HistoryFailed {
        session_id: String,
        epoch: u64,
        error: BackendError,
    },
    SessionsLoaded {
        seq: u64,
        sessions: Vec<SessionSummary>,
    },
    SessionsFailed { seq: u64, error: BackendError },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }

    pub fn select(session_id: impl Into<String>) -> Self {
        Event::SelectSession {
            session_id: session_id.into(),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserSubmit { .. } => "user_submit",
            Event::NewConversation => "new_conversation",
            Event::SelectSession { .. } => "select_session",
            Event::RefreshSessions => "refresh_sessions",
            Event::SendSucceeded { .. } => "send_succeeded",
            Event::SendFailed { .. } => "send_failed",
            Event::HistoryLoaded { .. } => "history_loaded",
            Event::HistoryFailed { .. } => "history_failed",
            Event::SessionsLoaded { .. } => "sessions_loaded",
            Event::SessionsFailed { .. } => "sessions_failed",
        }
    }
}
