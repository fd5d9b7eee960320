use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum length (in characters) of a derived conversation title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single committed chat message. Immutable once constructed; ordering
/// within a conversation is insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Opaque, time-derived unique id
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: time_derived_id(),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A conversation thread: title derived from the first user message,
/// messages in insertion order, timestamps in unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Conversation {
    /// Create a conversation titled after the first user message.
    pub fn new(first_user_text: &str) -> Self {
        let now = now_millis();
        Self {
            id: time_derived_id(),
            title: derive_title(first_user_text),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at` (strictly non-decreasing).
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = self.updated_at.max(now_millis());
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Truncate the first user message to a title of at most
/// [`TITLE_MAX_CHARS`] characters, falling back to "New chat" for
/// whitespace-only input so the title is never empty.
pub fn derive_title(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "New chat".to_string();
    }
    trimmed.chars().take(TITLE_MAX_CHARS).collect()
}

fn time_derived_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", now_millis(), &uuid[..8])
}
