//! Conversation titles and session labels
//!
//! Titles are derived locally from the first user message; the backend does
//! not name sessions.

use crate::backend::{HistoryMessage, HistoryRole};

pub const NEW_CONVERSATION_TITLE: &str = "New Conversation";
/// Used when a loaded session has no user turn to name it after
pub const FALLBACK_TITLE: &str = "Conversation";

const MAX_TITLE_CHARS: usize = 40;
const SESSION_LABEL_CHARS: usize = 8;

/// First 40 characters of the message, with an ellipsis when cut
pub fn title_from_message(message: &str) -> String {
    truncate_chars(message, MAX_TITLE_CHARS)
}

/// Title for a fetched history: its first user turn, else the fallback
pub fn title_from_history(history: &[HistoryMessage]) -> String {
    history
        .iter()
        .find(|m| m.role == HistoryRole::User)
        .map_or_else(|| FALLBACK_TITLE.to_string(), |m| title_from_message(&m.content))
}

/// Short form of a session id for the header
pub fn session_label(session_id: &str) -> String {
    let short: String = session_id.chars().take(SESSION_LABEL_CHARS).collect();
    format!("Session: {short}...")
}

fn truncate_chars(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
