//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg`, an optional YAML
//! configuration file, and the resolved [`ChatConfig`] the session runs with.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_API_URL;
use crate::error::{Error, Result};
use crate::notice::DEFAULT_NOTICE_TTL;
use crate::session_id::DEFAULT_STORAGE_KEY;

/// Number of recent transcript entries sent as request context.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Environment variable that overrides the API base URL.
pub const API_URL_ENV: &str = "PORTFOLIO_CHAT_API_URL";

/// Greeting shown when the widget opens.  Never part of the transcript.
pub const DEFAULT_GREETING: &str = "Hello! Welcome to my portfolio.\nAsk me anything about my skills, projects or experience.";

/// Command-line arguments for the portfolio-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the assistant API.
    #[arrrg(optional, "Base URL of the chat API (default: http://localhost:8000/api/v1)", "URL")]
    pub api_url: Option<String>,

    /// YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "FILE")]
    pub config: Option<String>,

    /// Where the session identifier is stored.
    #[arrrg(optional, "Path of the local session store", "FILE")]
    pub store: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// On-disk configuration; every field is optional and overrides the default.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Base URL of the assistant API.
    pub api_url: Option<String>,
    /// Storage key for the session identifier.
    pub storage_key: Option<String>,
    /// Path of the local session store.
    pub store_path: Option<PathBuf>,
    /// Entries of request context.
    pub context_window: Option<usize>,
    /// Notice display time in seconds.
    pub notice_secs: Option<u64>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Greeting text; an empty string disables it.
    pub greeting: Option<String>,
    /// Whether to use ANSI colors.
    pub color: Option<bool>,
}

impl ConfigFile {
    /// Reads a configuration file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// defaults, the configuration file, the environment and command-line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Base URL of the assistant API.
    pub api_url: String,

    /// Storage key the session identifier is kept under.
    pub storage_key: String,

    /// Path of the local session store; `None` keeps it in memory.
    pub store_path: Option<PathBuf>,

    /// Number of recent transcript entries sent as context.
    pub context_window: usize,

    /// How long an error notice stays visible.
    pub notice_ttl: Duration,

    /// Request timeout; `None` leaves the transport default.
    pub timeout: Option<Duration>,

    /// Greeting shown by views when the widget opens.
    pub greeting: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - API URL: http://localhost:8000/api/v1
    /// - Context window: 10 entries
    /// - Notice display time: 5 seconds
    /// - Timeout: none
    /// - Store: `<config dir>/portfolio-chat/storage.json`
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            store_path: default_store_path(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            notice_ttl: DEFAULT_NOTICE_TTL,
            timeout: None,
            greeting: Some(DEFAULT_GREETING.to_string()),
            use_color: true,
        }
    }

    /// Resolves defaults < config file < environment < command line.
    pub fn resolve(args: ChatArgs) -> Result<Self> {
        let mut config = Self::new();
        if let Some(path) = &args.config {
            config = config.merge_file(ConfigFile::from_file(path)?);
        }
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            config.api_url = url;
        }
        Ok(config.merge_args(args))
    }

    /// Overlays every field set in `file`.
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if let Some(key) = file.storage_key {
            self.storage_key = key;
        }
        if let Some(path) = file.store_path {
            self.store_path = Some(path);
        }
        if let Some(window) = file.context_window {
            self.context_window = window;
        }
        if let Some(secs) = file.notice_secs {
            self.notice_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(greeting) = file.greeting {
            self.greeting = Some(greeting).filter(|g| !g.is_empty());
        }
        if let Some(color) = file.color {
            self.use_color = color;
        }
        self
    }

    /// Overlays every flag set on the command line.
    pub fn merge_args(mut self, args: ChatArgs) -> Self {
        if let Some(url) = args.api_url {
            self.api_url = url;
        }
        if let Some(store) = args.store {
            self.store_path = Some(PathBuf::from(store));
        }
        if let Some(secs) = args.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        if args.no_color {
            self.use_color = false;
        }
        self
    }

    /// Sets the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the store path.
    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        self.store_path = path;
        self
    }

    /// Sets the number of context entries.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// Sets the notice display time.
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the greeting.
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("portfolio-chat").join("storage.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.storage_key, "chatbot_session_id");
        assert_eq!(config.context_window, 10);
        assert_eq!(config.notice_ttl, Duration::from_secs(5));
        assert!(config.timeout.is_none());
        assert!(config.greeting.is_some());
        assert!(config.use_color);
    }

    #[test]
    fn args_override_defaults() {
        let args = ChatArgs {
            api_url: Some("https://example.railway.app/api/v1".to_string()),
            config: None,
            store: Some("/tmp/chat-store.json".to_string()),
            timeout_secs: Some(20),
            no_color: true,
        };
        let config = ChatConfig::new().merge_args(args);
        assert_eq!(config.api_url, "https://example.railway.app/api/v1");
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/chat-store.json")));
        assert_eq!(config.timeout, Some(Duration::from_secs(20)));
        assert!(!config.use_color);
    }

    #[test]
    fn empty_args_change_nothing() {
        assert_eq!(
            ChatConfig::new().merge_args(ChatArgs::default()),
            ChatConfig::new()
        );
    }

    #[test]
    fn file_then_args() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.yaml");
        std::fs::write(
            &path,
            "api_url: https://from-file.example/api/v1\ncontext_window: 4\nnotice_secs: 8\ngreeting: \"\"\ncolor: false\n",
        )
        .unwrap();

        let file = tokio_test::assert_ok!(ConfigFile::from_file(&path));
        let config = ChatConfig::new().merge_file(file).merge_args(ChatArgs {
            api_url: Some("https://from-args.example/api/v1".to_string()),
            ..ChatArgs::default()
        });
        assert_eq!(config.api_url, "https://from-args.example/api/v1");
        assert_eq!(config.context_window, 4);
        assert_eq!(config.notice_ttl, Duration::from_secs(8));
        assert!(config.greeting.is_none());
        assert!(!config.use_color);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.yaml");
        std::fs::write(&path, "api_ulr: typo\n").unwrap();
        let err = tokio_test::assert_err!(ConfigFile::from_file(&path));
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_api_url("https://example.com/api/v1")
            .with_storage_key("other_key")
            .with_store_path(None)
            .with_context_window(3)
            .with_notice_ttl(Duration::from_secs(2))
            .with_timeout(Some(Duration::from_secs(9)))
            .with_greeting(None)
            .without_color();
        assert_eq!(config.api_url, "https://example.com/api/v1");
        assert_eq!(config.storage_key, "other_key");
        assert!(config.store_path.is_none());
        assert_eq!(config.context_window, 3);
        assert_eq!(config.notice_ttl, Duration::from_secs(2));
        assert_eq!(config.timeout, Some(Duration::from_secs(9)));
        assert!(config.greeting.is_none());
        assert!(!config.use_color);
    }
}
