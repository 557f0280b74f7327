//! Transcript view: the rendered conversation

use crate::format::format_turn;
use crate::state_machine::{Role, Turn};
use serde_json::Value;

pub const WELCOME_GREETING: &str = "👋 Welcome! I'm your Library Desk Agent.";
pub const WELCOME_INTRO: &str = "I can help you with:";

/// Capabilities listed on the welcome placeholder
pub const WELCOME_CAPABILITIES: &[&str] = &[
    "🔍 Finding books by title or author",
    "🛒 Creating orders",
    "📦 Restocking books",
    "💰 Updating prices",
    "📋 Checking order status",
    "📊 Viewing inventory",
];

/// One rendered element of the transcript
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    /// Placeholder shown for a fresh conversation
    Welcome,
    /// A user or assistant turn; `markup` is the formatter output
    Turn { role: Role, markup: String },
    /// A tool the agent invoked, with the full JSON of its arguments
    Tool { name: String, args: String },
    /// Transient typing marker, never part of history
    Typing,
}

/// Ordered, append-only rendering surface for one conversation
#[derive(Debug, Clone)]
pub struct TranscriptView {
    entries: Vec<TranscriptEntry>,
    /// Lines scrolled up from the bottom; 0 follows the newest entry
    scroll_back: u16,
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptView {
    pub fn new() -> Self {
        Self {
            entries: vec![TranscriptEntry::Welcome],
            scroll_back: 0,
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Format and append a turn, then scroll to the bottom
    pub fn append(&mut self, role: Role, content: &str) {
        self.push(TranscriptEntry::Turn {
            role,
            markup: format_turn(content),
        });
    }

    /// Append a tool indicator
    pub fn append_tool(&mut self, name: &str, args: &Value) {
        self.push(TranscriptEntry::Tool {
            name: name.to_string(),
            args: args.to_string(),
        });
    }

    /// Remove everything and restore the welcome placeholder
    pub fn clear(&mut self) {
        self.entries.clear();
        self.entries.push(TranscriptEntry::Welcome);
        self.scroll_back = 0;
    }

    /// Replace the content with a history snapshot
    pub fn replace(&mut self, turns: &[Turn]) {
        self.entries.clear();
        self.scroll_back = 0;
        for turn in turns {
            self.append(turn.role, &turn.content);
        }
    }

    pub fn show_pending(&mut self) {
        if !self.is_pending() {
            self.entries.push(TranscriptEntry::Typing);
            self.scroll_back = 0;
        }
    }

    pub fn dismiss_pending(&mut self) {
        self.entries.retain(|e| *e != TranscriptEntry::Typing);
    }

    pub fn is_pending(&self) -> bool {
        self.entries.last() == Some(&TranscriptEntry::Typing)
    }

    pub fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Clamp scroll-back to what the renderer can actually show
    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll_back = self.scroll_back.min(max);
    }

    /// Turns currently shown, in order (tool indicators and markers skipped)
    #[cfg(test)]
    pub fn turns(&self) -> impl Iterator<Item = (Role, &str)> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Turn { role, markup } => Some((*role, markup.as_str())),
            _ => None,
        })
    }

    fn push(&mut self, entry: TranscriptEntry) {
        self.entries.retain(|e| *e != TranscriptEntry::Welcome);
        // The typing marker stays last while present
        if self.is_pending() {
            let at = self.entries.len() - 1;
            self.entries.insert(at, entry);
        } else {
            self.entries.push(entry);
        }
        self.scroll_back = 0;
    }
}
