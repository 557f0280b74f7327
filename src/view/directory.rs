//! Session directory: the list of known sessions

use crate::backend::SessionSummary;

pub const NO_SESSIONS_PLACEHOLDER: &str = "No sessions yet";

/// One rendered session row
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub session_id: String,
    pub preview: String,
    pub date: String,
    pub active: bool,
}

impl SessionEntry {
    fn from_summary(summary: &SessionSummary, active: Option<&str>) -> Self {
        Self {
            session_id: summary.session_id.clone(),
            preview: format!("💬 Chat ({} msgs)", summary.message_count),
            date: summary.local_date(),
            active: active == Some(summary.session_id.as_str()),
        }
    }
}

/// Sessions in server order, with at most one active entry
#[derive(Debug, Clone, Default)]
pub struct SessionDirectory {
    entries: Vec<SessionEntry>,
    /// Row under the keyboard cursor
    cursor: usize,
    loaded: bool,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a fresh list. `active` is the controller's session at the
    /// moment the list is applied.
    pub fn render(&mut self, sessions: &[SessionSummary], active: Option<&str>) {
        let cursor_id = self.cursor_session_id().map(str::to_string);
        self.entries = sessions
            .iter()
            .map(|s| SessionEntry::from_summary(s, active))
            .collect();
        self.loaded = true;

        // Keep the cursor on the same session when it survived the refresh
        self.cursor = cursor_id
            .and_then(|id| self.entries.iter().position(|e| e.session_id == id))
            .or_else(|| self.entries.iter().position(|e| e.active))
            .unwrap_or(0);
    }

    /// Mark exactly `session_id` active, or none
    pub fn highlight(&mut self, session_id: Option<&str>) {
        for entry in &mut self.entries {
            entry.active = session_id == Some(entry.session_id.as_str());
        }
        if let Some(pos) = self.entries.iter().position(|e| e.active) {
            self.cursor = pos;
        }
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Text to show instead of entries, if any
    pub fn placeholder(&self) -> Option<&'static str> {
        if !self.loaded {
            Some("Loading sessions...")
        } else if self.entries.is_empty() {
            Some(NO_SESSIONS_PLACEHOLDER)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn active_session_id(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.active)
            .map(|e| e.session_id.as_str())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_session_id(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|e| e.session_id.as_str())
    }

    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}
