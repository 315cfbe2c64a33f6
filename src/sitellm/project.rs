//! Saved project context.
//!
//! Each project id owns one persisted blob: skills, rules, and whatever else
//! an operator wants restored at the start of a session. Context supplied as
//! a valid JSON string is stored structured; anything else is stored as the
//! raw string.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::sitellm::options::{OptionStore, OptionStoreError};

/// Per-project context blobs keyed by project id.
pub struct ProjectContextStore {
    options: Arc<dyn OptionStore>,
}

impl ProjectContextStore {
    /// Create a store over the given options backend.
    pub fn new(options: Arc<dyn OptionStore>) -> Self {
        Self { options }
    }

    fn option_name(project_id: &str) -> String {
        format!("project_context_{}", project_id)
    }

    /// Persist `raw` for `project_id`. A valid JSON document is decoded and
    /// stored structured; otherwise the raw string is stored as-is.
    pub fn save(&self, project_id: &str, raw: &str) -> Result<(), OptionStoreError> {
        let value = serde_json::from_str::<JsonValue>(raw)
            .unwrap_or_else(|_| JsonValue::String(raw.to_string()));
        self.options.set(&Self::option_name(project_id), &value)
    }

    /// Load the saved context for `project_id`, `None` when nothing is saved.
    pub fn load(&self, project_id: &str) -> Option<JsonValue> {
        self.options.get(&Self::option_name(project_id))
    }
}
