//! Input surface: the message editor

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Rows the editor grows to before it starts scrolling
pub const MAX_INPUT_ROWS: u16 = 5;

/// What a key press did to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Enter without Shift/Alt: the current text is offered for sending
    Submit(String),
    Edited,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct InputSurface {
    buffer: String,
    enabled: bool,
    focused: bool,
}

impl Default for InputSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSurface {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            enabled: true,
            focused: true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if !self.enabled || key.kind == KeyEventKind::Release {
            return InputAction::Ignored;
        }

        match key.code {
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.buffer.push('\n');
                InputAction::Edited
            }
            KeyCode::Enter => InputAction::Submit(self.buffer.clone()),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.push(c);
                InputAction::Edited
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    InputAction::Edited
                } else {
                    InputAction::Ignored
                }
            }
            _ => InputAction::Ignored,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Visible rows, growing with the text up to `MAX_INPUT_ROWS`
    pub fn height(&self) -> u16 {
        let lines = self.buffer.split('\n').count();
        u16::try_from(lines).unwrap_or(u16::MAX).clamp(1, MAX_INPUT_ROWS)
    }
}
