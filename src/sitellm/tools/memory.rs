//! Memory tools: set, get, search, list, delete.
//!
//! Thin envelope adapters over [`MemoryStore`]. Two behaviors worth calling
//! out:
//!
//! - `memory_set` receives its value as a string and tries to decode it as
//!   JSON first, so `"{\"a\":1}"` lands structured while `"plain text"` lands
//!   as a string.
//! - `memory_get` always carries a `data` field; an absent key and a stored
//!   JSON `null` both come back as `data: null` with `success: false`.

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::sitellm::memory::{MemoryStore, DEFAULT_CONTEXT};
use crate::sitellm::tool_protocol::{
    Envelope, RouterError, ToolDescriptor, ToolRouter, CORE_PRIORITY,
};
use crate::sitellm::tools::{required_str, str_or};

const CATEGORY: &str = "Memory System";

/// Register the five memory tools at [`CORE_PRIORITY`].
pub async fn register_memory_tools(
    router: &ToolRouter,
    store: Arc<MemoryStore>,
) -> Result<(), RouterError> {
    let set_store = Arc::clone(&store);
    router
        .register_with_priority(
            ToolDescriptor::new("memory_set", "Store a value in persistent memory.")
                .with_category(CATEGORY)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "key": { "type": "string", "description": "Memory key" },
                        "value": { "type": "string", "description": "Value to store (can be JSON)" },
                        "context": { "type": "string", "description": "Memory context/namespace", "default": DEFAULT_CONTEXT },
                    },
                    "required": ["key", "value"],
                })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let store = Arc::clone(&set_store);
                Box::pin(async move { memory_set(&store, args) })
            }),
        )
        .await?;

    let get_store = Arc::clone(&store);
    router
        .register_with_priority(
            ToolDescriptor::new("memory_get", "Retrieve a value from persistent memory.")
                .with_category(CATEGORY)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "key": { "type": "string", "description": "Memory key to retrieve" },
                        "context": { "type": "string", "description": "Memory context/namespace", "default": DEFAULT_CONTEXT },
                    },
                    "required": ["key"],
                })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let store = Arc::clone(&get_store);
                Box::pin(async move { memory_get(&store, args) })
            }),
        )
        .await?;

    let search_store = Arc::clone(&store);
    router
        .register_with_priority(
            ToolDescriptor::new("memory_search", "Search through stored memories.")
                .with_category(CATEGORY)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Search query" },
                        "context": { "type": "string", "description": "Context to search (or \"all\")", "default": DEFAULT_CONTEXT },
                        "limit": { "type": "integer", "description": "Max results", "default": 10 },
                    },
                    "required": ["query"],
                })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let store = Arc::clone(&search_store);
                Box::pin(async move { memory_search(&store, args) })
            }),
        )
        .await?;

    let list_store = Arc::clone(&store);
    router
        .register_with_priority(
            ToolDescriptor::new("memory_list", "List all memories in a context.")
                .with_category(CATEGORY)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "context": { "type": "string", "description": "Memory context/namespace", "default": DEFAULT_CONTEXT },
                    },
                })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let store = Arc::clone(&list_store);
                Box::pin(async move { memory_list(&store, args) })
            }),
        )
        .await?;

    let delete_store = Arc::clone(&store);
    router
        .register_with_priority(
            ToolDescriptor::new("memory_delete", "Delete a memory entry.")
                .with_category(CATEGORY)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "key": { "type": "string", "description": "Memory key to delete" },
                        "context": { "type": "string", "description": "Memory context/namespace", "default": DEFAULT_CONTEXT },
                    },
                    "required": ["key"],
                })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let store = Arc::clone(&delete_store);
                Box::pin(async move { memory_delete(&store, args) })
            }),
        )
        .await?;

    Ok(())
}

fn memory_set(store: &MemoryStore, args: JsonValue) -> Envelope {
    let key = match required_str(&args, "key") {
        Ok(key) => key,
        Err(envelope) => return envelope,
    };
    let raw = match args.get("value") {
        Some(value) => value.clone(),
        None => return Envelope::error("missing required argument: value"),
    };
    // String values that parse as JSON are stored structured.
    let value = match raw.as_str() {
        Some(text) => serde_json::from_str::<JsonValue>(text).unwrap_or(raw.clone()),
        None => raw,
    };
    let context = str_or(&args, "context", DEFAULT_CONTEXT);

    if store.set(key, value, context) {
        Envelope::ok().with_message("Memory stored")
    } else {
        Envelope::fail().with_message("Failed to store memory")
    }
}

fn memory_get(store: &MemoryStore, args: JsonValue) -> Envelope {
    let key = match required_str(&args, "key") {
        Ok(key) => key,
        Err(envelope) => return envelope,
    };
    let context = str_or(&args, "context", DEFAULT_CONTEXT);

    let value = store.get(key, context);
    let success = matches!(&value, Some(v) if !v.is_null());
    let mut envelope = if success { Envelope::ok() } else { Envelope::fail() };
    envelope = envelope.with_data(value.unwrap_or(JsonValue::Null));
    envelope
}

fn memory_search(store: &MemoryStore, args: JsonValue) -> Envelope {
    let query = match required_str(&args, "query") {
        Ok(query) => query,
        Err(envelope) => return envelope,
    };
    let context = str_or(&args, "context", DEFAULT_CONTEXT);
    let limit = args
        .get("limit")
        .and_then(JsonValue::as_u64)
        .unwrap_or(10) as usize;

    let hits = store.search(query, context, limit);
    match serde_json::to_value(hits) {
        Ok(data) => Envelope::ok().with_data(data),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn memory_list(store: &MemoryStore, args: JsonValue) -> Envelope {
    let context = str_or(&args, "context", DEFAULT_CONTEXT);
    match serde_json::to_value(store.list(context)) {
        Ok(data) => Envelope::ok().with_data(data),
        Err(err) => Envelope::error(err.to_string()),
    }
}

fn memory_delete(store: &MemoryStore, args: JsonValue) -> Envelope {
    let key = match required_str(&args, "key") {
        Ok(key) => key,
        Err(envelope) => return envelope,
    };
    let context = str_or(&args, "context", DEFAULT_CONTEXT);

    if store.delete(key, context) {
        Envelope::ok().with_message("Memory deleted")
    } else {
        Envelope::fail().with_message("Memory not found")
    }
}
