//! Client-local key/value storage for the session identifier.
//!
//! This plays the role a browser's local storage plays for the widget: a small,
//! durable map of string keys to string values that outlives a single page view.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde_json::{from_reader, to_vec_pretty};

use crate::error::{Error, Result};

/// A durable string key/value store.
pub trait SessionStore: Send {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` from the store.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// A store backed by a single JSON object on disk.
///
/// Every mutation rewrites the whole file: the new contents go to a sibling
/// `.tmp` file that is then renamed over the old one.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match File::open(&path) {
            Ok(file) => from_reader(BufReader::new(file)).map_err(|err| {
                Error::serialization(
                    format!("failed to parse store {}", path.display()),
                    Some(Box::new(err)),
                )
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(Error::io("failed to open store file", err)),
        };
        Ok(Self { path, values })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|err| Error::io("failed to create store directory", err))?;
        }
        let bytes = to_vec_pretty(&self.values).map_err(|err| {
            Error::serialization("failed to serialize store", Some(Box::new(err)))
        })?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        fs::write(&staging, bytes).map_err(|err| {
            Error::io(format!("failed to write {}", staging.display()), err)
        })?;
        fs::rename(&staging, &self.path).map_err(|err| {
            Error::io(format!("failed to replace {}", self.path.display()), err)
        })
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("chatbot_session_id").unwrap(), None);
        store.set("chatbot_session_id", "session_1_abcdefghi").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("chatbot_session_id").unwrap().as_deref(),
            Some("session_1_abcdefghi")
        );
    }

    #[test]
    fn failed_write_is_reported_and_keeps_old_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("chatbot_session_id", "session_1_abcdefghi").unwrap();

        // A directory squatting on the staging name makes the write fail.
        std::fs::create_dir(dir.path().join("storage.json.tmp")).unwrap();
        let err = store.set("chatbot_session_id", "session_2_jklmnopqr").unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err:?}");

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("chatbot_session_id").unwrap().as_deref(),
            Some("session_1_abcdefghi")
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_to_full_device_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::os::unix::fs::symlink("/dev/full", dir.path().join("storage.json.tmp")).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        let err = store.set("chatbot_session_id", "session_1_abcdefghi").unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err:?}");
        assert!(!path.exists());
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
