//! Transient error notices shown after a failed chat turn.

use std::time::{Duration, Instant};

use crate::error::{Error, FailureKind};

/// How long a notice stays visible before it dismisses itself.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Notice text for an HTTP 429 from the backend.
pub const RATE_LIMITED_TEXT: &str =
    "Request limit reached. Please wait a moment and try again.";

/// Notice text for every other failure.
pub const REQUEST_FAILED_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// A short-lived, user-facing notice describing a failed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    kind: FailureKind,
    text: &'static str,
    raised_at: Instant,
    ttl: Duration,
}

impl Notice {
    /// Build the notice for `kind`, raised at `raised_at`.
    pub fn new(kind: FailureKind, raised_at: Instant, ttl: Duration) -> Self {
        let text = match kind {
            FailureKind::RateLimited => RATE_LIMITED_TEXT,
            FailureKind::RequestFailed => REQUEST_FAILED_TEXT,
        };
        Self {
            kind,
            text,
            raised_at,
            ttl,
        }
    }

    /// Build the notice for an error, raised now.
    pub fn for_error(err: &Error, ttl: Duration) -> Self {
        Self::new(err.failure_kind(), Instant::now(), ttl)
    }

    /// Which failure this notice reports.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// The text shown to the user.
    pub fn text(&self) -> &'static str {
        self.text
    }

    /// How long the notice stays up.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True once `now` is at or past the dismissal deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_per_kind() {
        let now = Instant::now();
        assert_eq!(
            Notice::new(FailureKind::RateLimited, now, DEFAULT_NOTICE_TTL).text(),
            RATE_LIMITED_TEXT
        );
        assert_eq!(
            Notice::new(FailureKind::RequestFailed, now, DEFAULT_NOTICE_TTL).text(),
            REQUEST_FAILED_TEXT
        );
        assert_ne!(RATE_LIMITED_TEXT, REQUEST_FAILED_TEXT);
    }

    #[test]
    fn notice_for_error() {
        let notice = Notice::for_error(&Error::rate_limit("slow", None), DEFAULT_NOTICE_TTL);
        assert_eq!(notice.kind(), FailureKind::RateLimited);
        let notice = Notice::for_error(&Error::api(500, "boom", None), DEFAULT_NOTICE_TTL);
        assert_eq!(notice.kind(), FailureKind::RequestFailed);
    }

    #[test]
    fn expires_after_ttl() {
        let raised = Instant::now();
        let notice = Notice::new(FailureKind::RequestFailed, raised, DEFAULT_NOTICE_TTL);
        assert!(!notice.is_expired_at(raised));
        assert!(!notice.is_expired_at(raised + Duration::from_millis(4_999)));
        assert!(notice.is_expired_at(raised + Duration::from_secs(5)));
    }
}
