//! Output rendering for chat sessions.
//!
//! A [`ChatView`] is the presentation side of a [`ChatSession`](crate::chat::ChatSession):
//! the session tells it what changed and the view decides how to show it.  The
//! HTML widget lives in [`crate::html`]; this module holds the trait and the
//! terminal implementation used by the REPL.

use std::io::{self, Stdout, Write};

use crate::notice::Notice;
use crate::types::{Role, TranscriptEntry};

/// ANSI escape code for dim text (used for the typing indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for the typing indicator).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for notices).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI sequence that returns to column zero and erases the line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// The UI collaborator driven by a chat session.
///
/// Calls arrive in turn order: the user entry, send disabled, typing shown,
/// then after the round trip typing hidden, the reply or a notice, and send
/// enabled again.
pub trait ChatView: Send {
    /// A transcript entry was appended and should be displayed.
    fn append_entry(&mut self, entry: &TranscriptEntry);

    /// Enable or disable the send affordance.
    fn set_send_enabled(&mut self, enabled: bool);

    /// Show or hide the typing indicator.
    fn set_typing(&mut self, typing: bool);

    /// Show a transient error notice.
    fn show_notice(&mut self, notice: &Notice);
}

/// Terminal view with optional ANSI styling.
///
/// User entries are not echoed because the terminal already shows what was typed.
pub struct TerminalView {
    stdout: Stdout,
    use_color: bool,
    assistant_label: String,
    typing: bool,
    send_enabled: bool,
}

impl TerminalView {
    /// Creates a new TerminalView with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new TerminalView with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            assistant_label: "Assistant".to_string(),
            typing: false,
            send_enabled: true,
        }
    }

    /// Sets the label printed before assistant replies.
    pub fn with_assistant_label(mut self, label: impl Into<String>) -> Self {
        self.assistant_label = label.into();
        self
    }

    /// Returns true unless a turn is in flight.
    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// Flushes stdout to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    /// Print an informational message.
    pub fn print_info(&mut self, info: &str) {
        println!("{info}");
    }

    /// Print an error message.
    pub fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    /// Print an assistant message with its label, outside of any turn.
    pub fn print_assistant(&mut self, text: &str) {
        if self.use_color {
            println!("{ANSI_CYAN}{}:{ANSI_RESET} {text}", self.assistant_label);
        } else {
            println!("{}: {text}", self.assistant_label);
        }
        self.flush();
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for TerminalView {
    fn append_entry(&mut self, entry: &TranscriptEntry) {
        if entry.role == Role::Assistant {
            self.print_assistant(&entry.content);
        }
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn set_typing(&mut self, typing: bool) {
        if typing == self.typing {
            return;
        }
        self.typing = typing;
        if typing {
            if self.use_color {
                print!("{ANSI_DIM}{ANSI_ITALIC}{} is typing...{ANSI_RESET}", self.assistant_label);
            } else {
                println!("[{} is typing...]", self.assistant_label);
            }
        } else if self.use_color {
            print!("{ANSI_CLEAR_LINE}");
        }
        self.flush();
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.print_error(notice.text());
    }
}
