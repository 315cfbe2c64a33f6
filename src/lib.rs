//! # SiteLLM
//!
//! SiteLLM is a Rust toolkit for exposing generative-AI capabilities to a host
//! platform as a suite of named tools: text generation across OpenAI,
//! Anthropic, and OpenRouter, image generation through Replicate's async
//! prediction API, a persistent namespaced memory store, and saved per-project
//! context.
//!
//! The crate is layered so each piece is usable on its own:
//!
//! * **Provider Clients**: [`clients::openai::OpenAIClient`],
//!   [`clients::anthropic::AnthropicClient`], and
//!   [`clients::openrouter::OpenRouterClient`] implement the shared
//!   [`generation::GenerationClient`] trait; every failure mode comes back as
//!   a structured [`generation::GenerationResult`] rather than an `Err`.
//! * **Generation Dispatch**: [`Dispatcher`] routes a call to a provider by
//!   name, falling back to OpenAI for unrecognized names.
//! * **Image Predictions**: [`clients::replicate::ReplicateClient`] submits a
//!   prediction and polls it to a terminal state, with optional cancellation.
//! * **Memory**: [`MemoryStore`] keeps namespaced key/value entries persisted
//!   through a pluggable [`options::OptionStore`] backend.
//! * **Tool Routing**: [`ToolRouter`] maps tool names to descriptors and
//!   async handlers; [`tools::register_core_tools`] contributes the nine core
//!   tools, and site extensions register their own alongside them.
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use sitellm::clients::replicate::ReplicateClient;
//! use sitellm::config::ProviderKeys;
//! use sitellm::options::{JsonFileOptions, OptionStore};
//! use sitellm::tools::register_core_tools;
//! use sitellm::{Dispatcher, MemoryStore, ProjectContextStore, ToolRouter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     sitellm::init_logger();
//!
//!     let options: Arc<dyn OptionStore> = Arc::new(JsonFileOptions::new("./state")?);
//!     let keys = ProviderKeys::resolve(options.as_ref());
//!
//!     let router = ToolRouter::new();
//!     register_core_tools(
//!         &router,
//!         Arc::new(MemoryStore::new(Arc::clone(&options))),
//!         Arc::new(Dispatcher::new(&keys)),
//!         Arc::new(ReplicateClient::new(keys.replicate.clone())),
//!         Arc::new(ProjectContextStore::new(Arc::clone(&options))),
//!     )
//!     .await?;
//!
//!     let envelope = router
//!         .dispatch("memory_set", json!({"key": "city", "value": "Paris", "context": "travel"}))
//!         .await?;
//!     println!("stored: {}", envelope.success);
//!     Ok(())
//! }
//! ```
//!
//! Continue exploring the modules re-exported from the crate root for the
//! individual layers.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Applications embedding SiteLLM opt in to `RUST_LOG` driven diagnostics
/// without choosing a logging backend upfront.
///
/// ```rust
/// sitellm::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `sitellm` module.
pub mod sitellm;

// Re-exporting key items for easier external access.
pub use sitellm::clients;
pub use sitellm::config;
pub use sitellm::dispatcher;
pub use sitellm::dispatcher::Dispatcher;
pub use sitellm::generation;
pub use sitellm::generation::{GenerationClient, GenerationOptions, GenerationResult};
pub use sitellm::memory;
pub use sitellm::memory::MemoryStore;
pub use sitellm::options;
pub use sitellm::project;
pub use sitellm::project::ProjectContextStore;
pub use sitellm::tool_protocol;
pub use sitellm::tool_protocol::{Envelope, RouterError, ToolDescriptor, ToolRouter};
pub use sitellm::tools;
