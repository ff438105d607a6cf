// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod html;
pub mod notice;
pub mod observability;
pub mod render;
pub mod session_id;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{ChatClient, ChatTransport};
pub use client_logger::ExchangeLogger;
pub use error::{Error, FailureKind, Result};
pub use html::{HtmlView, escape_html};
pub use notice::Notice;
pub use observability::register_biometrics;
pub use render::{ChatView, TerminalView};
pub use session_id::SessionId;
pub use storage::{FileStore, MemoryStore, SessionStore};
pub use types::*;
