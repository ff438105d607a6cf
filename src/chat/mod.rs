//! Chat widget session for the portfolio assistant.
//!
//! This module provides the session that backs the chat widget, plus the
//! pieces of the interactive REPL built on top of it:
//!
//! - A persistent session identifier and an in-memory transcript
//! - One request in flight at a time, with a typing indicator while it runs
//! - Soft, auto-dismissing notices instead of errors
//! - Slash commands for inspecting the session
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and API interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{ChatView, TerminalView};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{
    API_URL_ENV, ChatArgs, ChatConfig, ConfigFile, DEFAULT_CONTEXT_WINDOW, DEFAULT_GREETING,
};
pub use session::{ChatSession, SessionStats, SubmitOutcome};
