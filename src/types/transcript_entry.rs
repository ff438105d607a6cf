use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::Role;

/// One message in the in-memory transcript.
///
/// The same shape is sent back to the backend as request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// The raw, unescaped message text.
    pub content: String,

    /// Who wrote it.
    pub role: Role,

    /// When the entry was appended, as RFC 3339.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,
}

impl TranscriptEntry {
    /// Create an entry stamped with the given time.
    pub fn new(content: impl Into<String>, role: Role, timestamp: OffsetDateTime) -> Self {
        Self {
            content: content.into(),
            role,
            timestamp,
        }
    }

    /// Create a user entry stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Role::User, OffsetDateTime::now_utc())
    }

    /// Create an assistant entry stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, Role::Assistant, OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};
    use time::macros::datetime;

    #[test]
    fn entry_serializes_with_iso_timestamp() {
        let entry = TranscriptEntry::new("hello", Role::User, datetime!(2024-05-01 12:30:00 UTC));
        assert_eq!(
            to_value(&entry).unwrap(),
            json!({
                "content": "hello",
                "role": "user",
                "timestamp": "2024-05-01T12:30:00Z"
            })
        );
    }

    #[test]
    fn entry_accepts_millisecond_timestamps() {
        let entry: TranscriptEntry = serde_json::from_value(json!({
            "content": "hi there",
            "role": "assistant",
            "timestamp": "2024-05-01T12:30:00.123Z"
        }))
        .unwrap();
        assert_eq!(entry.role, Role::Assistant);
        assert_eq!(entry.timestamp.millisecond(), 123);
    }
}
