use serde::{Deserialize, Serialize};

use crate::models::chat::{Message, Role};

/// Request body for the assistant endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Full prior history plus the new user message, in order
    pub messages: Vec<WireMessage>,
    /// Opaque user identifier
    pub user: String,
}

impl ChatRequest {
    pub fn from_history(messages: &[Message], user: impl Into<String>) -> Self {
        Self {
            messages: messages.iter().map(WireMessage::from).collect(),
            user: user.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
        }
    }
}

/// Body of a single streamed event. Both fields are optional on the wire;
/// a frame may carry text, a completion flag, or both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamPayload {
    pub content: Option<String>,

    #[serde(default)]
    pub done: bool,
}

/// Error body shape returned on non-success responses. Fields are checked
/// in declaration order: `error`, then `message`, then `details`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).or(self.details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let history = vec![Message::user("Hello"), Message::assistant("Hi!")];
        let req = ChatRequest::from_history(&history, "u-1");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["user"], "u-1");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["messages"][1]["role"], "assistant");
    }

    #[test]
    fn test_payload_optional_fields() {
        let p: StreamPayload = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(p.content.as_deref(), Some("hi"));
        assert!(!p.done);

        let p: StreamPayload = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(p.content.is_none());
        assert!(p.done);
    }

    #[test]
    fn test_error_body_priority() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"second","error":"first","details":"third"}"#)
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("first"));

        let body: ErrorBody = serde_json::from_str(r#"{"details":"only"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("only"));
    }
}
