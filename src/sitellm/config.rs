//! Provider API key resolution.
//!
//! Each provider key resolves with the precedence "environment variable
//! overrides persisted option": deployments can pin a key in the environment
//! while the option store carries operator-edited values.
//!
//! # Example
//!
//! ```rust
//! use sitellm::config::ProviderKeys;
//! use sitellm::options::MemoryOptions;
//! use serde_json::json;
//!
//! let options = MemoryOptions::new();
//! use sitellm::options::OptionStore;
//! options.set(sitellm::config::OPENAI_KEY_OPTION, &json!("sk-persisted")).unwrap();
//!
//! let keys = ProviderKeys::resolve(&options);
//! // "sk-persisted" unless OPENAI_API_KEY is set in the environment.
//! assert!(keys.openai.is_some());
//! ```

use crate::sitellm::options::OptionStore;

/// Environment variable names checked first, one per provider.
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const OPENROUTER_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const REPLICATE_KEY_ENV: &str = "REPLICATE_API_KEY";

/// Option names consulted when the environment variable is unset.
pub const OPENAI_KEY_OPTION: &str = "openai_api_key";
pub const ANTHROPIC_KEY_OPTION: &str = "anthropic_api_key";
pub const OPENROUTER_KEY_OPTION: &str = "openrouter_api_key";
pub const REPLICATE_KEY_OPTION: &str = "replicate_api_key";

/// The resolved API keys for all four providers.
///
/// A key that is absent or empty in both sources stays `None`; clients built
/// from a `None` key report a configuration failure instead of calling out.
#[derive(Clone, Debug, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub openrouter: Option<String>,
    pub replicate: Option<String>,
}

impl ProviderKeys {
    /// Resolve all four keys from the process environment and the option store.
    pub fn resolve(options: &dyn OptionStore) -> Self {
        Self::resolve_from(|name| std::env::var(name).ok(), options)
    }

    /// Resolve using an explicit environment lookup. The seam `resolve` is
    /// built on; tests supply a closure over a fixed map.
    pub fn resolve_from<F>(env: F, options: &dyn OptionStore) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            openai: resolve_one(&env, options, OPENAI_KEY_ENV, OPENAI_KEY_OPTION),
            anthropic: resolve_one(&env, options, ANTHROPIC_KEY_ENV, ANTHROPIC_KEY_OPTION),
            openrouter: resolve_one(&env, options, OPENROUTER_KEY_ENV, OPENROUTER_KEY_OPTION),
            replicate: resolve_one(&env, options, REPLICATE_KEY_ENV, REPLICATE_KEY_OPTION),
        }
    }
}

fn resolve_one<F>(
    env: &F,
    options: &dyn OptionStore,
    env_name: &str,
    option_name: &str,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = env(env_name).filter(|k| !k.is_empty()) {
        return Some(key);
    }
    options
        .get(option_name)
        .and_then(|v| v.as_str().map(str::to_owned))
        .filter(|k| !k.is_empty())
}
