use serde::{Deserialize, Serialize};

/// Body of a successful `POST /chat` response.
///
/// Only `message` is required; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub message: String,

    /// The session the backend attributed the turn to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Backend status marker, `"success"` in practice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ChatResponse {
    /// Create a response carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_response() {
        let response: ChatResponse = serde_json::from_str(r#"{"message":"hi there"}"#).unwrap();
        assert_eq!(response, ChatResponse::new("hi there"));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"message":"ok","session_id":"abc","timestamp":"2024-01-01T00:00:00","status":"success","extra":1}"#,
        )
        .unwrap();
        assert_eq!(response.message, "ok");
        assert_eq!(response.session_id.as_deref(), Some("abc"));
        assert_eq!(response.status.as_deref(), Some("success"));
    }

    #[test]
    fn message_is_required() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"status":"success"}"#).is_err());
    }
}
