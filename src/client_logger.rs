//! Logging trait for chat client exchanges.
//!
//! This module provides the [`ExchangeLogger`] trait that allows users to capture
//! every request and outcome passing through the [`ChatClient`](crate::ChatClient).

use crate::error::Error;
use crate::types::{ChatRequest, ChatResponse};

/// A trait for logging chat exchanges.
///
/// # Example
///
/// ```rust,ignore
/// use portfolio_chat::{ChatRequest, ChatResponse, Error, ExchangeLogger};
///
/// struct StderrLogger;
///
/// impl ExchangeLogger for StderrLogger {
///     fn log_request(&self, request: &ChatRequest) {
///         eprintln!("-> {}", serde_json::to_string(request).unwrap());
///     }
///
///     fn log_response(&self, response: &ChatResponse) {
///         eprintln!("<- {}", response.message);
///     }
///
///     fn log_failure(&self, error: &Error) {
///         eprintln!("!! {error}");
///     }
/// }
/// ```
pub trait ExchangeLogger: Send + Sync {
    /// Called once per chat request, before it is sent.
    fn log_request(&self, request: &ChatRequest);

    /// Called once per successfully parsed chat response.
    fn log_response(&self, response: &ChatResponse);

    /// Called once per failed chat request, whatever the cause.
    fn log_failure(&self, error: &Error);
}
