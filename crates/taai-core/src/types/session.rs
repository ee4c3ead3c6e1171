use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used until the first user message arrives
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Number of characters of the first user message kept in the title
pub const TITLE_MAX_CHARS: usize = 50;

/// Session metadata record as kept in the session list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    /// Number of messages, not counting the welcome message
    pub message_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl ChatSession {
    /// Create an empty session record
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            timestamp: Utc::now(),
            message_count: 0,
            last_message: None,
        }
    }

    /// Whether the session has at least one real message
    pub fn is_visible(&self) -> bool {
        self.message_count > 0
    }

    /// Derive a title from the first user message: the first 50 characters
    /// followed by an ellipsis.
    pub fn title_from(first_message: &str) -> String {
        let head: String = first_message.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    }
}
