//! Project-context tools: load and save per-project state.

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::sitellm::project::ProjectContextStore;
use crate::sitellm::tool_protocol::{
    Envelope, RouterError, ToolDescriptor, ToolRouter, CORE_PRIORITY,
};
use crate::sitellm::tools::required_str;

const CATEGORY: &str = "Project Management";

/// Register `load_project_context` and `save_project_context` at
/// [`CORE_PRIORITY`].
pub async fn register_project_tools(
    router: &ToolRouter,
    store: Arc<ProjectContextStore>,
) -> Result<(), RouterError> {
    let load_store = Arc::clone(&store);
    router
        .register_with_priority(
            ToolDescriptor::new(
                "load_project_context",
                "Load saved project context including skills, rules, and memory.",
            )
            .with_category(CATEGORY)
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project identifier (e.g., site slug)" },
                },
                "required": ["project_id"],
            })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let store = Arc::clone(&load_store);
                Box::pin(async move { load_project_context(&store, args) })
            }),
        )
        .await?;

    let save_store = Arc::clone(&store);
    router
        .register_with_priority(
            ToolDescriptor::new(
                "save_project_context",
                "Save current project context for future sessions.",
            )
            .with_category(CATEGORY)
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project identifier" },
                    "context": { "type": "string", "description": "JSON context data to save" },
                },
                "required": ["project_id", "context"],
            })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let store = Arc::clone(&save_store);
                Box::pin(async move { save_project_context(&store, args) })
            }),
        )
        .await?;

    Ok(())
}

fn load_project_context(store: &ProjectContextStore, args: JsonValue) -> Envelope {
    let project_id = match required_str(&args, "project_id") {
        Ok(id) => id,
        Err(envelope) => return envelope,
    };

    match store.load(project_id) {
        Some(context) if !context.is_null() => Envelope::ok()
            .with_data(context)
            .with_message(format!("Loaded project context for {}", project_id)),
        _ => Envelope::fail().with_message(format!("No saved context for {}", project_id)),
    }
}

fn save_project_context(store: &ProjectContextStore, args: JsonValue) -> Envelope {
    let project_id = match required_str(&args, "project_id") {
        Ok(id) => id,
        Err(envelope) => return envelope,
    };
    let context = match required_str(&args, "context") {
        Ok(context) => context,
        Err(envelope) => return envelope,
    };

    match store.save(project_id, context) {
        Ok(()) => {
            Envelope::ok().with_message(format!("Saved project context for {}", project_id))
        }
        Err(err) => Envelope::error(err.to_string()),
    }
}
