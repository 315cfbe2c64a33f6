//! Persisted option storage.
//!
//! The memory store and the per-project context blobs are persisted through the
//! [`OptionStore`] trait: a flat map of option name to JSON value, written whole
//! on every update. [`JsonFileOptions`] keeps one file per option under a
//! directory; [`MemoryOptions`] backs tests and ephemeral deployments.
//!
//! # Example
//!
//! ```rust
//! use sitellm::options::{MemoryOptions, OptionStore};
//! use serde_json::json;
//!
//! let options = MemoryOptions::new();
//! options.set("greeting", &json!({"text": "hello"})).unwrap();
//! assert_eq!(options.get("greeting").unwrap()["text"], "hello");
//! assert!(options.delete("greeting").unwrap());
//! ```

use log::warn;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Errors surfaced by [`OptionStore`] implementations.
#[derive(Debug)]
pub enum OptionStoreError {
    /// Underlying filesystem failure.
    Io(std::io::Error),
    /// The value could not be serialized or the stored bytes were not valid JSON.
    Serialization(serde_json::Error),
}

impl fmt::Display for OptionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionStoreError::Io(err) => write!(f, "option store I/O error: {}", err),
            OptionStoreError::Serialization(err) => {
                write!(f, "option store serialization error: {}", err)
            }
        }
    }
}

impl Error for OptionStoreError {}

impl From<std::io::Error> for OptionStoreError {
    fn from(err: std::io::Error) -> Self {
        OptionStoreError::Io(err)
    }
}

impl From<serde_json::Error> for OptionStoreError {
    fn from(err: serde_json::Error) -> Self {
        OptionStoreError::Serialization(err)
    }
}

/// A named-blob configuration store.
///
/// Every `set` replaces the whole value for that name; there is no partial
/// update and no versioning. Implementations must make a completed `set`
/// visible to subsequent `get` calls on the same store.
pub trait OptionStore: Send + Sync {
    /// Fetch an option by name, `None` when absent.
    fn get(&self, name: &str) -> Option<JsonValue>;

    /// Store (or overwrite) an option.
    fn set(&self, name: &str, value: &JsonValue) -> Result<(), OptionStoreError>;

    /// Remove an option. Returns `true` when an entry existed.
    fn delete(&self, name: &str) -> Result<bool, OptionStoreError>;
}

/// File-backed option store: one JSON file per option name.
pub struct JsonFileOptions {
    dir: PathBuf,
}

impl JsonFileOptions {
    /// Open (creating if needed) an option directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, OptionStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        // Option names may embed caller-supplied ids; anything outside a safe
        // filename alphabet maps to '_'.
        let safe: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl OptionStore for JsonFileOptions {
    fn get(&self, name: &str) -> Option<JsonValue> {
        let path = self.path_for(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("JsonFileOptions::get({}): read failed: {}", name, err);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("JsonFileOptions::get({}): corrupt option file: {}", name, err);
                None
            }
        }
    }

    fn set(&self, name: &str, value: &JsonValue) -> Result<(), OptionStoreError> {
        let path = self.path_for(name);
        let bytes = serde_json::to_vec_pretty(value)?;
        // Write-then-rename so readers never observe a half-written blob.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, OptionStoreError> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process option store with no persistence.
#[derive(Default)]
pub struct MemoryOptions {
    values: Mutex<HashMap<String, JsonValue>>,
}

impl MemoryOptions {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptions {
    fn get(&self, name: &str) -> Option<JsonValue> {
        self.values.lock().unwrap().get(name).cloned()
    }

    fn set(&self, name: &str, value: &JsonValue) -> Result<(), OptionStoreError> {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.clone());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, OptionStoreError> {
        Ok(self.values.lock().unwrap().remove(name).is_some())
    }
}
