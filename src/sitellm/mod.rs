// src/sitellm/mod.rs

pub mod clients;
pub mod config;
pub mod dispatcher;
pub mod generation;
pub mod memory;
pub mod options;
pub mod project;
pub mod tool_protocol;
pub mod tools;

// Export the pieces a host wires together so callers reach them as
// sitellm::Dispatcher instead of sitellm::sitellm::dispatcher::Dispatcher.
pub use dispatcher::Dispatcher;
pub use memory::MemoryStore;
pub use project::ProjectContextStore;
pub use tool_protocol::ToolRouter;
