//! Persistent namespaced key/value memory.
//!
//! [`MemoryStore`] keeps the full map in memory — contexts (namespaces) of
//! key→entry — and writes the whole blob through its [`OptionStore`] on every
//! mutation before returning. There is no partial update, no versioning and
//! no cross-process conflict detection: two writers racing on the same
//! backing store lose the earlier write. That is acceptable for the
//! single-operator deployments this core targets and is the documented
//! limitation of this layer.
//!
//! A stored JSON `null` is indistinguishable from an absent key through
//! [`get`](MemoryStore::get)'s `Option` only at the entry level: `get` returns
//! `Some(Value::Null)` for the former and `None` for the latter, but the
//! memory tool handlers collapse both to a null payload, matching the
//! behavior callers of the original integration depend on.
//!
//! # Example
//!
//! ```rust
//! use sitellm::memory::MemoryStore;
//! use sitellm::options::MemoryOptions;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = MemoryStore::new(Arc::new(MemoryOptions::new()));
//! store.set("city", json!("Paris"), "travel");
//! assert_eq!(store.get("city", "travel"), Some(json!("Paris")));
//! assert!(store.delete("city", "travel"));
//! assert_eq!(store.get("city", "travel"), None);
//! ```

use chrono::Utc;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::sitellm::options::OptionStore;

/// Option name the full memory blob persists under.
pub const MEMORY_OPTION: &str = "memory_store";

/// Context used when callers name none.
pub const DEFAULT_CONTEXT: &str = "global";

/// One stored value plus the Unix timestamp of its last write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub value: JsonValue,
    pub timestamp: i64,
}

/// A search match: where it was found and what it holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub context: String,
    pub key: String,
    pub value: JsonValue,
}

type ContextMap = BTreeMap<String, BTreeMap<String, MemoryEntry>>;

/// Namespaced key/value store persisted whole on every write.
pub struct MemoryStore {
    options: Arc<dyn OptionStore>,
    store: Mutex<ContextMap>,
}

impl MemoryStore {
    /// Load the store from `options`, starting empty when nothing (or a
    /// corrupt blob) is persisted.
    pub fn new(options: Arc<dyn OptionStore>) -> Self {
        let store = match options.get(MEMORY_OPTION) {
            Some(blob) => match serde_json::from_value(blob) {
                Ok(map) => map,
                Err(err) => {
                    warn!("MemoryStore::new: discarding corrupt memory blob: {}", err);
                    ContextMap::new()
                }
            },
            None => ContextMap::new(),
        };
        Self {
            options,
            store: Mutex::new(store),
        }
    }

    /// Store `value` at `(context, key)`, overwriting any existing entry, and
    /// persist the full store before returning. Always reports `true`; a
    /// failed persist is logged and the in-memory write stands.
    pub fn set(&self, key: &str, value: JsonValue, context: &str) -> bool {
        let mut store = self.store.lock().unwrap();
        store.entry(context.to_string()).or_default().insert(
            key.to_string(),
            MemoryEntry {
                value,
                timestamp: Utc::now().timestamp(),
            },
        );
        self.persist(&store);
        true
    }

    /// Fetch the value at `(context, key)`. `None` when absent; an entry
    /// holding JSON `null` comes back as `Some(Value::Null)`.
    pub fn get(&self, key: &str, context: &str) -> Option<JsonValue> {
        let store = self.store.lock().unwrap();
        store
            .get(context)
            .and_then(|entries| entries.get(key))
            .map(|entry| entry.value.clone())
    }

    /// Case-insensitive substring search over keys and serialized values.
    /// `context` scopes the scan; `"all"` scans every context. Returns the
    /// first `limit` matches in sorted (context, key) encounter order.
    pub fn search(&self, query: &str, context: &str, limit: usize) -> Vec<SearchHit> {
        let needle = query.to_lowercase();
        let store = self.store.lock().unwrap();
        let mut hits = Vec::new();

        let scopes: Vec<(&String, &BTreeMap<String, MemoryEntry>)> = if context == "all" {
            store.iter().collect()
        } else {
            store.get_key_value(context).into_iter().collect()
        };

        'scan: for (ctx, entries) in scopes {
            for (key, entry) in entries {
                let serialized = serde_json::to_string(&entry.value).unwrap_or_default();
                if key.to_lowercase().contains(&needle)
                    || serialized.to_lowercase().contains(&needle)
                {
                    hits.push(SearchHit {
                        context: ctx.clone(),
                        key: key.clone(),
                        value: entry.value.clone(),
                    });
                    if hits.len() >= limit {
                        break 'scan;
                    }
                }
            }
        }

        hits
    }

    /// Dump every entry in a context. Empty map for an unknown context.
    pub fn list(&self, context: &str) -> BTreeMap<String, MemoryEntry> {
        let store = self.store.lock().unwrap();
        store.get(context).cloned().unwrap_or_default()
    }

    /// Remove the entry at `(context, key)`. Returns `true` (after
    /// persisting) only when an entry existed.
    pub fn delete(&self, key: &str, context: &str) -> bool {
        let mut store = self.store.lock().unwrap();
        let removed = store
            .get_mut(context)
            .map(|entries| entries.remove(key).is_some())
            .unwrap_or(false);
        if removed {
            self.persist(&store);
        }
        removed
    }

    fn persist(&self, store: &ContextMap) {
        match serde_json::to_value(store) {
            Ok(blob) => {
                if let Err(err) = self.options.set(MEMORY_OPTION, &blob) {
                    error!("MemoryStore::persist: write failed: {}", err);
                }
            }
            Err(err) => error!("MemoryStore::persist: serialization failed: {}", err),
        }
    }
}
