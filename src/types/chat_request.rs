use serde::{Deserialize, Serialize};

use crate::types::TranscriptEntry;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message for this turn.
    pub message: String,

    /// The persistent client session identifier.
    pub session_id: String,

    /// The most recent transcript entries, oldest first, including this turn's
    /// user entry.
    pub context: Vec<TranscriptEntry>,
}

impl ChatRequest {
    /// Build a request whose context is the last `window` entries of `transcript`.
    pub fn new(
        message: impl Into<String>,
        session_id: impl Into<String>,
        transcript: &[TranscriptEntry],
        window: usize,
    ) -> Self {
        let start = transcript.len().saturating_sub(window);
        Self {
            message: message.into(),
            session_id: session_id.into(),
            context: transcript[start..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn transcript(n: usize) -> Vec<TranscriptEntry> {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                TranscriptEntry::new(format!("m{i}"), role, time::OffsetDateTime::UNIX_EPOCH)
            })
            .collect()
    }

    #[test]
    fn context_keeps_most_recent_in_order() {
        let entries = transcript(15);
        let request = ChatRequest::new("m14", "session_1_abc", &entries, 10);
        let contents: Vec<_> = request.context.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["m5", "m6", "m7", "m8", "m9", "m10", "m11", "m12", "m13", "m14"]
        );
    }

    #[test]
    fn short_transcript_is_sent_whole() {
        let entries = transcript(3);
        let request = ChatRequest::new("m2", "s", &entries, 10);
        assert_eq!(request.context, entries);
    }

    #[test]
    fn wire_shape() {
        let request = ChatRequest::new("hello", "session_1_abcdefghi", &[], 10);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "message": "hello",
                "session_id": "session_1_abcdefghi",
                "context": []
            })
        );
    }
}
