use serde::{Deserialize, Serialize};

/// Remaining requests in one rate-limit window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaWindow {
    /// Requests allowed per window.
    pub limit: u32,

    /// Requests left in the current window.
    pub remaining: u32,

    /// When the window resets, as the backend formats it.
    pub reset_at: String,
}

/// Per-minute and per-hour quota for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// The per-minute window.
    pub minute: QuotaWindow,

    /// The per-hour window.
    pub hour: QuotaWindow,
}

/// Body of `GET /chat/quota`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaResponse {
    /// The quota snapshot.
    pub quota: Quota,

    /// Backend status marker.
    #[serde(default)]
    pub status: Option<String>,
}
