//! Conversation state types

use crate::backend::{HistoryMessage, HistoryRole};

// ============================================================================
// Turns
// ============================================================================

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One user or assistant message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[cfg(test)]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// History rows with other roles are fetched but never rendered
    pub fn from_history(message: &HistoryMessage) -> Option<Self> {
        let role = match message.role {
            HistoryRole::User => Role::User,
            HistoryRole::Assistant => Role::Assistant,
            HistoryRole::Other(_) => return None,
        };
        Some(Self {
            role,
            content: message.content.clone(),
        })
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Send lifecycle phase
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConvState {
    /// Ready for input, nothing in flight
    #[default]
    Idle,

    /// One turn in flight; input disabled
    Sending {
        /// The trimmed text that was sent (used for the title on first reply)
        message: String,
    },
}

/// A history fetch that has not answered yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub session_id: String,
    pub epoch: u64,
}

/// Everything the controller knows about the conversation on screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationState {
    pub phase: ConvState,

    /// `None` until the first successful send of a new conversation
    pub active_session_id: Option<String>,

    /// Bumped by every action that changes what the transcript shows.
    /// Answers issued under an older epoch are discarded.
    pub view_epoch: u64,

    /// Latest history fetch still in flight
    pub pending_selection: Option<PendingSelection>,

    /// Sequence number of the last session-list request issued
    pub refresh_issued: u64,

    /// Sequence number of the last session list applied
    pub refresh_applied: u64,

    /// Session ids the directory currently lists
    pub known_sessions: Vec<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True for the whole interval between submit and the send settling
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, ConvState::Sending { .. })
    }

    pub fn is_listed(&self, session_id: &str) -> bool {
        self.known_sessions.iter().any(|id| id == session_id)
    }
}
