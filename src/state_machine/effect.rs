//! Effects produced by state transitions

use crate::backend::{ChatRequest, SessionSummary, ToolInvocation};
use crate::state_machine::state::{Role, Turn};

/// Prefix of the synthetic assistant turn rendered for a failed send
pub const ERROR_MARKER: &str = "⚠️ Error:";

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    // Transcript
    RenderTurn { role: Role, content: String },
    RenderTool { invocation: ToolInvocation },
    ShowPending,
    DismissPending,
    /// Clear and restore the welcome placeholder
    ClearTranscript,
    /// Full snapshot, not a merge
    ReplaceTranscript { turns: Vec<Turn> },

    // Input surface
    ClearInput,
    SetInputEnabled { enabled: bool },
    FocusInput,

    // Header
    SetTitle { title: String },
    SetSessionLabel { label: Option<String> },

    // Session directory
    HighlightSession { session_id: Option<String> },
    /// `active` is the controller's session when the list was applied
    RenderSessions {
        sessions: Vec<SessionSummary>,
        active: Option<String>,
    },

    // Backend
    SendTurn { request: ChatRequest },
    FetchSessions { seq: u64 },
    FetchHistory { session_id: String, epoch: u64 },

    // Logging only
    ReportBackgroundFailure {
        operation: &'static str,
        message: String,
    },
    DiscardStale {
        operation: &'static str,
        reason: String,
    },
}

impl Effect {
    pub fn render_user(content: impl Into<String>) -> Self {
        Effect::RenderTurn {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn render_assistant(content: impl Into<String>) -> Self {
        Effect::RenderTurn {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Synthetic assistant turn describing a failed send
    pub fn render_send_error(detail: &str) -> Self {
        Effect::render_assistant(format!("{ERROR_MARKER} {detail}"))
    }

    pub fn set_input_enabled(enabled: bool) -> Self {
        Effect::SetInputEnabled { enabled }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Effect::SetTitle {
            title: title.into(),
        }
    }

    pub fn report_background_failure(operation: &'static str, message: impl Into<String>) -> Self {
        Effect::ReportBackgroundFailure {
            operation,
            message: message.into(),
        }
    }

    pub fn discard_stale(operation: &'static str, reason: impl Into<String>) -> Self {
        Effect::DiscardStale {
            operation,
            reason: reason.into(),
        }
    }
}
