//! Generation dispatch across providers.
//!
//! The [`Dispatcher`] owns one client per text provider and routes a call by
//! provider name. An unrecognized name falls back to the default provider
//! (OpenAI) rather than erroring — deliberate permissiveness inherited from
//! the original integration, kept here and logged so misrouted calls are
//! visible. Calls are independent and unthrottled; there is no budget or
//! mutual exclusion at this layer.
//!
//! # Example
//!
//! ```rust,no_run
//! use sitellm::config::ProviderKeys;
//! use sitellm::dispatcher::Dispatcher;
//! use sitellm::generation::GenerationOptions;
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::new(&ProviderKeys::default());
//!     let result = dispatcher
//!         .execute("anthropic", "Name three rivers.", GenerationOptions::default())
//!         .await;
//!     println!("success={}", result.success);
//! }
//! ```

use crate::sitellm::clients::anthropic::AnthropicClient;
use crate::sitellm::clients::openai::OpenAIClient;
use crate::sitellm::clients::openrouter::OpenRouterClient;
use crate::sitellm::config::ProviderKeys;
use crate::sitellm::generation::{GenerationClient, GenerationOptions, GenerationResult};
use log::warn;

/// Name of the provider used when the caller names no provider, or an
/// unrecognized one.
pub const DEFAULT_PROVIDER: &str = "openai";

/// The text-generation providers the dispatcher can route to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    OpenRouter,
}

impl Provider {
    /// Map a provider name to a variant. Unrecognized names fall back to
    /// [`Provider::OpenAi`] with a warning.
    pub fn parse(name: &str) -> Self {
        match name {
            "openai" => Provider::OpenAi,
            "anthropic" => Provider::Anthropic,
            "openrouter" => Provider::OpenRouter,
            other => {
                warn!(
                    "Provider::parse: unknown provider '{}', falling back to {}",
                    other, DEFAULT_PROVIDER
                );
                Provider::OpenAi
            }
        }
    }
}

/// Routes generation calls to the configured provider clients.
pub struct Dispatcher {
    openai: OpenAIClient,
    anthropic: AnthropicClient,
    openrouter: OpenRouterClient,
}

impl Dispatcher {
    /// Build a dispatcher whose clients target the providers' public
    /// endpoints with the given keys.
    pub fn new(keys: &ProviderKeys) -> Self {
        Self {
            openai: OpenAIClient::new(keys.openai.clone()),
            anthropic: AnthropicClient::new(keys.anthropic.clone()),
            openrouter: OpenRouterClient::new(keys.openrouter.clone()),
        }
    }

    /// Build a dispatcher from explicitly constructed clients. Used when a
    /// client needs a custom base URL or referer.
    pub fn from_clients(
        openai: OpenAIClient,
        anthropic: AnthropicClient,
        openrouter: OpenRouterClient,
    ) -> Self {
        Self {
            openai,
            anthropic,
            openrouter,
        }
    }

    /// Execute one generation call against the named provider. The
    /// provider's default model applies when `options.model` is unset; all
    /// failure modes come back inside the [`GenerationResult`].
    pub async fn execute(
        &self,
        provider: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> GenerationResult {
        match Provider::parse(provider) {
            Provider::OpenAi => self.openai.generate(prompt, &options).await,
            Provider::Anthropic => self.anthropic.generate(prompt, &options).await,
            Provider::OpenRouter => self.openrouter.generate(prompt, &options).await,
        }
    }
}
