//! Wire types for the chat agent endpoints

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// `null` starts a new session server-side
    pub session_id: Option<String>,
    pub message: String,
}

/// Successful answer to `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tool_calls: Vec<ToolInvocation>,
}

impl ChatReply {
    /// Reply text worth rendering. Empty text counts as absent.
    pub fn reply_text(&self) -> Option<&str> {
        self.response.as_deref().filter(|text| !text.is_empty())
    }
}

/// A tool the agent ran while producing a reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolInvocation {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Error body for non-2xx answers
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// FastAPI sends a string for handled errors and a list of objects for
    /// validation failures; anything that is not a string is shown as JSON.
    pub fn detail_text(self) -> Option<String> {
        match self.detail? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// One row of `GET /api/sessions`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub started: String,
    #[serde(default)]
    pub message_count: u64,
}

impl SessionSummary {
    #[cfg(test)]
    pub fn new(session_id: impl Into<String>, started: impl Into<String>, message_count: u64) -> Self {
        Self {
            session_id: session_id.into(),
            started: started.into(),
            message_count,
        }
    }

    /// Parse `started`, accepting RFC 3339 and SQLite's `CURRENT_TIMESTAMP`
    /// format (UTC, no offset).
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.started.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Local calendar date of `started` as numeric `YYYY-MM-DD`, or the raw
    /// value if unparseable. chrono has no locale data without its
    /// `unstable-locales` feature, so a numeric date stands in for a
    /// localized one.
    pub fn local_date(&self) -> String {
        match self.started_at() {
            Some(ts) => ts.with_timezone(&Local).format("%Y-%m-%d").to_string(),
            None => self.started.clone(),
        }
    }
}

/// Role of a history row. Roles other than user/assistant are kept so the
/// fetch never fails on them, but they are not rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum HistoryRole {
    User,
    Assistant,
    Other(String),
}

impl From<String> for HistoryRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "user" => HistoryRole::User,
            "assistant" => HistoryRole::Assistant,
            _ => HistoryRole::Other(role),
        }
    }
}

/// One row of `GET /api/sessions/{id}/messages`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryMessage {
    pub role: HistoryRole,
    #[serde(default)]
    pub content: String,
}

impl HistoryMessage {
    #[cfg(test)]
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::from(role.to_string()),
            content: content.into(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ToolInvocation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ToolInvocation>>::deserialize(deserializer)?.unwrap_or_default())
}
