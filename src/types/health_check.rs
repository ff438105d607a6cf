use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// `"healthy"` or `"degraded"`.
    pub status: String,

    /// Backend version string.
    #[serde(default)]
    pub version: Option<String>,

    /// Deployment environment name.
    #[serde(default)]
    pub environment: Option<String>,

    /// Backend clock at the time of the check.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthCheck {
    /// Returns true if every backend dependency reported healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_is_not_healthy() {
        let health: HealthCheck = serde_json::from_str(
            r#"{"status":"degraded","version":"0.1.0","environment":"production"}"#,
        )
        .unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.version.as_deref(), Some("0.1.0"));
        assert!(health.timestamp.is_none());
    }
}
