//! Core chat session management.
//!
//! This module provides the [`ChatSession`] struct which owns the persistent
//! session identifier, the in-memory transcript and the request/response cycle
//! against the assistant backend.
//!
//! At most one turn is in flight at a time.  [`ChatSession::submit`] takes
//! `&self`, so several callers may drive it concurrently, but a call made while
//! a reply is awaited is dropped rather than queued.  The state lock is never
//! held across the network round trip.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::chat::config::ChatConfig;
use crate::client::ChatTransport;
use crate::error::{Error, Result};
use crate::notice::Notice;
use crate::observability::{
    SESSION_DISCARDED, SESSION_FAILURES, SESSION_REPLIES, SESSION_SUBMITS,
    SESSION_SUBMITS_IGNORED,
};
use crate::render::ChatView;
use crate::session_id::SessionId;
use crate::storage::SessionStore;
use crate::types::{ChatRequest, Role, TranscriptEntry};

/// What became of one call to [`ChatSession::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input, a turn already in flight, or a detached session.  Nothing changed.
    Ignored,
    /// The assistant replied; the entry has been appended.
    Replied(TranscriptEntry),
    /// The request failed; only the user's entry was appended.
    Failed(Notice),
    /// The session was detached while the request was in flight.
    Discarded,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The persistent session identifier.
    pub session_id: String,
    /// Number of transcript entries.
    pub message_count: usize,
    /// Number of user entries.
    pub user_messages: usize,
    /// Number of assistant entries.
    pub assistant_messages: usize,
    /// Turns that ended without a reply.
    pub failed_turns: u64,
    /// Entries of context sent per request.
    pub context_window: usize,
    /// True while a reply is awaited.
    pub awaiting_response: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Vec<TranscriptEntry>,
    awaiting_response: bool,
    detached: bool,
    failed_turns: u64,
}

/// A chat session bound to one transport and one persisted identifier.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    session_id: SessionId,
    context_window: usize,
    notice_ttl: Duration,
    state: Mutex<SessionState>,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Sets up a session: reads the persisted identifier from `store` (creating
    /// and persisting one if absent) and starts with an empty transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn initialize(
        transport: T,
        store: &mut dyn SessionStore,
        config: &ChatConfig,
    ) -> Result<Self> {
        let session_id = SessionId::load_or_create(store, &config.storage_key)?;
        Ok(Self {
            transport,
            session_id,
            context_window: config.context_window,
            notice_ttl: config.notice_ttl,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Sends one user message and renders the outcome through `view`.
    ///
    /// Blank input, or input arriving while a reply is still awaited, is ignored.
    /// Failures are never returned; they become a [`Notice`] on the view, and the
    /// user's entry stays in the transcript.
    pub async fn submit(&self, text: &str, view: &mut dyn ChatView) -> SubmitOutcome {
        let Some((request, user_entry)) = self.begin(text) else {
            SESSION_SUBMITS_IGNORED.click();
            return SubmitOutcome::Ignored;
        };
        SESSION_SUBMITS.click();

        view.append_entry(&user_entry);
        view.set_send_enabled(false);
        view.set_typing(true);

        let result = self.transport.send(&request).await;

        let mut state = self.lock();
        state.awaiting_response = false;
        if state.detached {
            SESSION_DISCARDED.click();
            return SubmitOutcome::Discarded;
        }

        let outcome = match result {
            Ok(response) => {
                let entry = TranscriptEntry::assistant(response.message);
                state.transcript.push(entry.clone());
                drop(state);
                SESSION_REPLIES.click();
                view.set_typing(false);
                view.append_entry(&entry);
                SubmitOutcome::Replied(entry)
            }
            Err(err) => {
                state.failed_turns += 1;
                drop(state);
                SESSION_FAILURES.click();
                log::warn!("chat request failed for {}: {err}", self.session_id);
                let notice = Notice::for_error(&err, self.notice_ttl);
                view.set_typing(false);
                view.show_notice(&notice);
                SubmitOutcome::Failed(notice)
            }
        };
        view.set_send_enabled(true);
        outcome
    }

    /// Checks the gate, appends the user entry and builds the request.
    fn begin(&self, text: &str) -> Option<(ChatRequest, TranscriptEntry)> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut state = self.lock();
        if state.awaiting_response || state.detached {
            return None;
        }
        let entry = TranscriptEntry::user(text);
        state.transcript.push(entry.clone());
        state.awaiting_response = true;
        let request = ChatRequest::new(
            text,
            self.session_id.as_str(),
            &state.transcript,
            self.context_window,
        );
        Some((request, entry))
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the owning widget as torn down.
    ///
    /// A reply that arrives afterwards is dropped without touching the
    /// transcript or the view, and later submits are ignored.
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    /// Returns true once [`detach`](Self::detach) has been called.
    pub fn is_detached(&self) -> bool {
        self.lock().detached
    }

    /// The persistent session identifier.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns true while a reply is awaited.
    pub fn is_awaiting_response(&self) -> bool {
        self.lock().awaiting_response
    }

    /// A snapshot of the transcript, oldest first.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.lock().transcript.clone()
    }

    /// Returns the number of entries in the transcript.
    pub fn message_count(&self) -> usize {
        self.lock().transcript.len()
    }

    /// Entries of context sent with each request.
    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// The transport this session sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let state = self.lock();
        let user_messages = state
            .transcript
            .iter()
            .filter(|e| e.role == Role::User)
            .count();
        SessionStats {
            session_id: self.session_id.to_string(),
            message_count: state.transcript.len(),
            user_messages,
            assistant_messages: state.transcript.len() - user_messages,
            failed_turns: state.failed_turns,
            context_window: self.context_window,
            awaiting_response: state.awaiting_response,
        }
    }

    /// Exports the transcript to `path` as JSON.
    ///
    /// This is an explicit export; the transcript is never written to the
    /// session store.
    pub fn save_transcript_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let entries = self.transcript();
        let transcript = TranscriptFile {
            version: 1,
            session_id: self.session_id.as_str(),
            entries: &entries,
        };
        let file = File::create(path.as_ref())
            .map_err(|err| Error::io("failed to create transcript file", err))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, &transcript).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })
    }
}

#[derive(Serialize)]
struct TranscriptFile<'a> {
    version: u8,
    session_id: &'a str,
    entries: &'a [TranscriptEntry],
}
