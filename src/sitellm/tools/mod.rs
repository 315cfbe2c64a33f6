//! Core tool registrations.
//!
//! Each submodule registers one group of tools against a [`ToolRouter`]:
//! the memory tools, the generation tools, and the project-context tools.
//! [`register_core_tools`] wires all of them at [`CORE_PRIORITY`] so they
//! list ahead of site extensions, which register later at the default
//! priority.
//!
//! ```ignore
//! use sitellm::tools::register_core_tools;
//!
//! register_core_tools(&router, memory, dispatcher, replicate, projects).await?;
//! let descriptors = router.list_tools().await;
//! ```

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::sitellm::clients::replicate::ReplicateClient;
use crate::sitellm::dispatcher::Dispatcher;
use crate::sitellm::memory::MemoryStore;
use crate::sitellm::project::ProjectContextStore;
use crate::sitellm::tool_protocol::{Envelope, RouterError, ToolRouter};

pub mod generate;
pub mod memory;
pub mod project;

/// Register every core tool group at [`CORE_PRIORITY`].
///
/// [`CORE_PRIORITY`]: crate::sitellm::tool_protocol::CORE_PRIORITY
pub async fn register_core_tools(
    router: &ToolRouter,
    memory: Arc<MemoryStore>,
    dispatcher: Arc<Dispatcher>,
    replicate: Arc<ReplicateClient>,
    projects: Arc<ProjectContextStore>,
) -> Result<(), RouterError> {
    memory::register_memory_tools(router, memory).await?;
    generate::register_generation_tools(router, dispatcher, replicate).await?;
    project::register_project_tools(router, projects).await?;
    Ok(())
}

/// Pull a required string argument, or the error envelope the handler should
/// return instead.
pub(crate) fn required_str<'a>(args: &'a JsonValue, field: &str) -> Result<&'a str, Envelope> {
    args.get(field)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Envelope::error(format!("missing required argument: {}", field)))
}

/// An optional string argument with a fallback.
pub(crate) fn str_or<'a>(args: &'a JsonValue, field: &str, default: &'a str) -> &'a str {
    args.get(field).and_then(JsonValue::as_str).unwrap_or(default)
}
