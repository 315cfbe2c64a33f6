//! Tool descriptors, result envelopes, and the callback router.
//!
//! A host discovers tools through [`ToolRouter::list_tools`] and invokes them
//! through [`ToolRouter::dispatch`]. Registration is explicit: every
//! contributor — the core at priority 5, site extensions at the default
//! priority 10 — calls [`ToolRouter::register`] at startup, and a name that is
//! already taken is rejected outright rather than silently shadowing the
//! earlier registration. Dispatch is a plain name-keyed lookup; an unknown
//! name is a [`RouterError::NotFound`], not a pass-through.
//!
//! # Example
//!
//! ```rust
//! use sitellm::tool_protocol::{Envelope, ToolDescriptor, ToolRouter};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = ToolRouter::new();
//! router.register(
//!     ToolDescriptor::new("echo", "Echo the input back").with_category("Demo"),
//!     Arc::new(|args| Box::pin(async move { Envelope::ok().with_data(args) })),
//! ).await?;
//!
//! let envelope = router.dispatch("echo", json!({"text": "hi"})).await?;
//! assert!(envelope.success);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registration priority of the core tools.
pub const CORE_PRIORITY: u32 = 5;
/// Registration priority extensions get by default.
pub const DEFAULT_PRIORITY: u32 = 10;

/// Describes one tool to the host: identity, category for grouping in tool
/// listings, and a JSON-Schema-like input description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDescriptor {
    /// Create a descriptor with an empty category and schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: String::new(),
            input_schema: JsonValue::Null,
        }
    }

    /// Set the grouping category shown in tool listings.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the JSON-Schema-like input description.
    pub fn with_schema(mut self, schema: JsonValue) -> Self {
        self.input_schema = schema;
        self
    }
}

/// The uniform result shape every tool handler returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Successful envelope with no payload yet.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error: None,
        }
    }

    /// Failed envelope with no detail yet.
    pub fn fail() -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: None,
        }
    }

    /// Failed envelope carrying an error string.
    pub fn error(error: impl Into<String>) -> Self {
        Self::fail().with_error(error)
    }

    /// Attach a data payload.
    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach a human-readable status message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach an error string.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// An async tool handler: argument map in, envelope out. Handlers report
/// their own failures inside the envelope; the router never sees them as
/// errors.
pub type ToolHandler =
    Arc<dyn Fn(JsonValue) -> Pin<Box<dyn Future<Output = Envelope> + Send>> + Send + Sync>;

/// Errors raised by the router itself (as opposed to tool-level failures,
/// which ride inside the [`Envelope`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A registration reused a tool name already taken.
    DuplicateName(String),
    /// Dispatch named a tool nobody registered.
    NotFound(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::DuplicateName(name) => {
                write!(f, "Tool name already registered: {}", name)
            }
            RouterError::NotFound(name) => write!(f, "Tool not found: {}", name),
        }
    }
}

impl Error for RouterError {}

struct Registration {
    descriptor: ToolDescriptor,
    priority: u32,
    seq: u64,
}

#[derive(Default)]
struct RouterInner {
    handlers: HashMap<String, ToolHandler>,
    registrations: Vec<Registration>,
    next_seq: u64,
}

/// The shared tool registry and dispatch table.
pub struct ToolRouter {
    inner: RwLock<RouterInner>,
}

impl ToolRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RouterInner::default()),
        }
    }

    /// Register a tool at [`DEFAULT_PRIORITY`].
    pub async fn register(
        &self,
        descriptor: ToolDescriptor,
        handler: ToolHandler,
    ) -> Result<(), RouterError> {
        self.register_with_priority(descriptor, DEFAULT_PRIORITY, handler)
            .await
    }

    /// Register a tool at an explicit priority. Lower priorities list first;
    /// ties list in registration order. Fails if the name is taken.
    pub async fn register_with_priority(
        &self,
        descriptor: ToolDescriptor,
        priority: u32,
        handler: ToolHandler,
    ) -> Result<(), RouterError> {
        let mut inner = self.inner.write().await;
        if inner.handlers.contains_key(&descriptor.name) {
            return Err(RouterError::DuplicateName(descriptor.name.clone()));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .handlers
            .insert(descriptor.name.clone(), handler);
        inner.registrations.push(Registration {
            descriptor,
            priority,
            seq,
        });
        Ok(())
    }

    /// Descriptors of every registered tool, ordered by (priority,
    /// registration order).
    pub async fn list_tools(&self) -> Vec<ToolDescriptor> {
        let inner = self.inner.read().await;
        let mut registrations: Vec<&Registration> = inner.registrations.iter().collect();
        registrations.sort_by_key(|r| (r.priority, r.seq));
        registrations
            .into_iter()
            .map(|r| r.descriptor.clone())
            .collect()
    }

    /// Whether a tool name is registered.
    pub async fn contains(&self, name: &str) -> bool {
        self.inner.read().await.handlers.contains_key(name)
    }

    /// Invoke a tool by name. The handler's envelope comes back as-is; only
    /// an unknown name is an `Err`.
    pub async fn dispatch(&self, name: &str, args: JsonValue) -> Result<Envelope, RouterError> {
        let handler = {
            let inner = self.inner.read().await;
            inner
                .handlers
                .get(name)
                .cloned()
                .ok_or_else(|| RouterError::NotFound(name.to_string()))?
        };
        Ok(handler(args).await)
    }
}

impl Default for ToolRouter {
    fn default() -> Self {
        Self::new()
    }
}
