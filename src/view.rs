//! Rendering surfaces driven by the conversation controller
//!
//! Views hold what is on screen and nothing else; every decision about what
//! to show comes from the state machine's effects.

use crate::title::NEW_CONVERSATION_TITLE;

pub mod directory;
pub mod input;
pub mod transcript;

pub use directory::SessionDirectory;
pub use input::{InputAction, InputSurface};
pub use transcript::{
    TranscriptEntry, TranscriptView, WELCOME_CAPABILITIES, WELCOME_GREETING, WELCOME_INTRO,
};

/// Conversation title and the short label of the active session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHeader {
    pub title: String,
    pub session_label: Option<String>,
}

impl ChatHeader {
    pub fn new() -> Self {
        Self {
            title: NEW_CONVERSATION_TITLE.to_string(),
            session_label: None,
        }
    }
}

impl Default for ChatHeader {
    fn default() -> Self {
        Self::new()
    }
}
