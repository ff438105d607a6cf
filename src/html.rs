//! HTML rendering of the chat widget.
//!
//! The widget is a pure function of [`HtmlView`] state: entries, the typing
//! indicator, the send affordance, live notices and whether the window is open.
//! All message text goes through [`escape_html`], so neither the visitor nor the
//! assistant can inject markup.

use std::fmt::Write as _;
use std::time::Instant;

use crate::notice::Notice;
use crate::render::ChatView;
use crate::types::TranscriptEntry;

/// Default widget title.
pub const DEFAULT_TITLE: &str = "AI Assistant";

/// Escape `text` for insertion into HTML, turning newlines into `<br>`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Render one transcript entry as a message bubble.
pub fn render_entry(entry: &TranscriptEntry) -> String {
    format!(
        r#"<div class="message {}"><div class="message-content">{}</div></div>"#,
        entry.role.as_str(),
        escape_html(&entry.content)
    )
}

/// Widget state bound to a chat session.
#[derive(Debug, Clone)]
pub struct HtmlView {
    title: String,
    greeting: Option<String>,
    entries: Vec<String>,
    notices: Vec<Notice>,
    typing: bool,
    send_enabled: bool,
    open: bool,
}

impl HtmlView {
    /// Creates a closed widget with the given greeting.
    pub fn new(greeting: Option<String>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            greeting,
            entries: Vec::new(),
            notices: Vec::new(),
            typing: false,
            send_enabled: true,
            open: false,
        }
    }

    /// Sets the header title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Opens the window if closed and closes it if open.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Opens the chat window.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the chat window.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Returns true if the chat window is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true while the typing indicator is shown.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Returns true unless a turn is in flight.
    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// Notices that have not been pruned yet.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Number of rendered transcript entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Drops every notice whose display time has elapsed at `now`.
    pub fn prune_notices(&mut self, now: Instant) {
        self.notices.retain(|n| !n.is_expired_at(now));
    }

    /// Renders the message list: greeting, entries, typing indicator and notices.
    ///
    /// Notices past their display time are left out even if not yet pruned.
    pub fn render_messages(&self) -> String {
        self.render_messages_at(Instant::now())
    }

    /// Renders the message list as it should look at `now`.
    pub fn render_messages_at(&self, now: Instant) -> String {
        let mut out = String::new();
        if let Some(greeting) = &self.greeting {
            let _ = write!(
                out,
                r#"<div class="message assistant"><div class="message-content">{}</div></div>"#,
                escape_html(greeting)
            );
        }
        for entry in &self.entries {
            out.push_str(entry);
        }
        if self.typing {
            out.push_str(
                r#"<div id="typing-indicator" class="message assistant"><div class="typing-indicator"><span class="typing-dot"></span><span class="typing-dot"></span><span class="typing-dot"></span></div></div>"#,
            );
        }
        for notice in self.notices.iter().filter(|n| !n.is_expired_at(now)) {
            let _ = write!(
                out,
                r#"<div class="error-message">{}</div>"#,
                escape_html(notice.text())
            );
        }
        out
    }

    /// Renders the whole widget: launcher button and window.
    pub fn render(&self) -> String {
        let window_class = if self.open {
            "chatbot-window active"
        } else {
            "chatbot-window"
        };
        let disabled = if self.send_enabled { "" } else { " disabled" };
        format!(
            concat!(
                r#"<button id="chatbot-button" class="chatbot-button" aria-label="Open chat"></button>"#,
                r#"<div id="chatbot-window" class="{window_class}">"#,
                r#"<div class="chatbot-header"><div><h3>{title}</h3>"#,
                r#"<div class="chatbot-status"><span class="status-dot"></span><span>Online</span></div></div>"#,
                r#"<button id="chatbot-close" class="chatbot-close">&times;</button></div>"#,
                r#"<div id="chatbot-messages" class="chatbot-messages">{messages}</div>"#,
                r#"<div class="chatbot-input"><div class="input-wrapper">"#,
                r#"<textarea id="chatbot-input" class="chatbot-textarea" rows="1"></textarea>"#,
                r#"<button id="chatbot-send" class="send-button"{disabled}></button>"#,
                r#"</div></div></div>"#
            ),
            window_class = window_class,
            title = escape_html(&self.title),
            messages = self.render_messages(),
            disabled = disabled,
        )
    }
}

impl Default for HtmlView {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ChatView for HtmlView {
    fn append_entry(&mut self, entry: &TranscriptEntry) {
        self.entries.push(render_entry(entry));
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.prune_notices(Instant::now());
        self.notices.push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::notice::DEFAULT_NOTICE_TTL;
    use crate::types::Role;
    use std::time::Duration;

    #[test]
    fn script_is_escaped_and_newlines_break() {
        assert_eq!(
            escape_html("<script>alert(1)</script>\nline2"),
            "&lt;script&gt;alert(1)&lt;/script&gt;<br>line2"
        );
    }

    #[test]
    fn attributes_cannot_be_broken_out_of() {
        assert_eq!(
            escape_html(r#"" onmouseover='x' & more"#),
            "&quot; onmouseover=&#39;x&#39; &amp; more"
        );
        assert_eq!(escape_html("a\r\nb"), "a<br>b");
    }

    #[test]
    fn entries_are_escaped_for_both_roles() {
        for role in [Role::User, Role::Assistant] {
            let entry = TranscriptEntry::new(
                "<img src=x onerror=alert(1)>",
                role,
                time::OffsetDateTime::UNIX_EPOCH,
            );
            let html = render_entry(&entry);
            assert!(!html.contains("<img"));
            assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
            assert!(html.starts_with(&format!(r#"<div class="message {role}">"#)));
        }
    }

    #[test]
    fn typing_indicator_and_disabled_send() {
        let mut view = HtmlView::new(None);
        view.set_send_enabled(false);
        view.set_typing(true);
        let html = view.render();
        assert!(html.contains(r#"id="typing-indicator""#));
        assert!(html.contains(r#"class="send-button" disabled"#));

        view.set_typing(false);
        view.set_send_enabled(true);
        let html = view.render();
        assert!(!html.contains("typing-indicator"));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn notices_dismiss_after_ttl() {
        let mut view = HtmlView::new(None);
        let raised = Instant::now();
        view.show_notice(&Notice::new(
            FailureKind::RateLimited,
            raised,
            DEFAULT_NOTICE_TTL,
        ));
        assert!(view.render_messages().contains("error-message"));

        view.prune_notices(raised + Duration::from_secs(1));
        assert_eq!(view.notices().len(), 1);

        view.prune_notices(raised + Duration::from_secs(5));
        assert!(view.notices().is_empty());
        assert!(!view.render_messages().contains("error-message"));
    }

    #[test]
    fn expired_notices_are_not_rendered_before_pruning() {
        let mut view = HtmlView::new(None);
        let raised = Instant::now();
        view.show_notice(&Notice::new(
            FailureKind::RequestFailed,
            raised,
            DEFAULT_NOTICE_TTL,
        ));
        assert!(
            view.render_messages_at(raised + Duration::from_secs(4))
                .contains("Sorry, something went wrong")
        );
        assert!(
            !view
                .render_messages_at(raised + Duration::from_secs(5))
                .contains("error-message")
        );
        assert_eq!(view.notices().len(), 1);

        view.show_notice(&Notice::new(FailureKind::RateLimited, raised, Duration::ZERO));
        assert!(!view.render().contains("Request limit reached"));
    }

    #[test]
    fn title_is_escaped() {
        let view = HtmlView::new(None).with_title("Ask <Me>");
        assert!(view.render().contains("<h3>Ask &lt;Me&gt;</h3>"));
        assert!(HtmlView::default().render().contains("<h3>AI Assistant</h3>"));
    }

    #[test]
    fn greeting_and_window_state() {
        let mut view = HtmlView::new(Some("Welcome!\nAsk me anything.".to_string()));
        assert!(view.render_messages().contains("Welcome!<br>Ask me anything."));
        assert!(!view.is_open());
        assert!(view.render().contains(r#"class="chatbot-window""#));
        view.toggle();
        assert!(view.is_open());
        assert!(view.render().contains(r#"class="chatbot-window active""#));
        view.close();
        assert!(!view.is_open());
        view.open();
        assert!(view.is_open());
        assert_eq!(view.entry_count(), 0);
    }
}
