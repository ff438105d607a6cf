//! Persistent client session identifiers.
//!
//! An identifier looks like `session_1714566600000_k3j9x0q2m`: a fixed prefix,
//! the creation time in epoch milliseconds and nine random base-36 characters.
//! It is created once per store and reused until the stored value is cleared.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Result;
use crate::storage::SessionStore;
use crate::utils::time::unix_millis;

/// Storage key the identifier is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "chatbot_session_id";

const PREFIX: &str = "session";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// An opaque token correlating requests to a conversation on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        Self::generate_at(OffsetDateTime::now_utc(), &mut rand::thread_rng())
    }

    /// Generates an identifier for the given creation time and random source.
    pub fn generate_at<R: Rng>(created: OffsetDateTime, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{PREFIX}_{}_{suffix}", unix_millis(created)))
    }

    /// Wraps a previously stored value without checking its shape.
    ///
    /// Stored identifiers are opaque; one written by an older client is reused
    /// as long as it can travel in a request header.  Returns `None` otherwise.
    pub fn from_stored(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let usable = !value.is_empty()
            && value
                .bytes()
                .all(|b| b == b'\t' || (0x20..0x7f).contains(&b));
        usable.then_some(Self(value))
    }

    /// Returns true if `value` has the shape this client generates.
    pub fn is_well_formed(value: &str) -> bool {
        let mut parts = value.split('_');
        let (Some(prefix), Some(millis), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        prefix == PREFIX
            && !millis.is_empty()
            && millis.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == SUFFIX_LEN
            && suffix.bytes().all(|b| BASE36.contains(&b))
    }

    /// Reads the identifier under `key`, creating and persisting one if the
    /// stored value is missing, empty or not sendable as a header.
    pub fn load_or_create(store: &mut dyn SessionStore, key: &str) -> Result<Self> {
        if let Some(existing) = store.get(key)? {
            let cleared = existing.is_empty();
            if let Some(id) = Self::from_stored(existing) {
                return Ok(id);
            }
            if !cleared {
                log::warn!("discarding unusable session identifier under {key}");
            }
        }
        let id = Self::generate();
        store.set(key, id.as_str())?;
        log::debug!("created session identifier {id}");
        Ok(id)
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
