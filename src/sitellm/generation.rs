//! Generation request/response types and the provider client trait.
//!
//! Every text-generation provider implements [`GenerationClient`]: one prompt
//! in, one [`GenerationResult`] out. Failures — missing key, transport error,
//! provider-reported error, malformed body — are all carried in the result
//! value; `generate` never returns `Err` and never panics, so a tool handler
//! can forward the outcome directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// System prompt used when the caller does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
/// Token budget applied when the caller does not supply one.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
/// Sampling temperature applied when the caller does not supply one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Per-call generation parameters. Unset fields fall back to the provider's
/// defaults at request-build time.
#[derive(Clone, Debug, Default)]
pub struct GenerationOptions {
    /// Provider-specific model identifier.
    pub model: Option<String>,
    /// System prompt steering the response.
    pub system: Option<String>,
    /// Maximum completion tokens.
    pub max_tokens: Option<u32>,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: Option<f64>,
}

impl GenerationOptions {
    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Outcome of one generation call.
///
/// Exactly one of `content` (on success) or `error` (on failure) is populated.
/// `usage` carries the provider's token accounting when the provider reports
/// one; OpenRouter responses omit it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    /// Successful completion.
    pub fn success(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            model: Some(model.into()),
            usage: None,
            error: None,
        }
    }

    /// Attach the provider's usage report.
    pub fn with_usage(mut self, usage: JsonValue) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Failed call with the given error text.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            model: None,
            usage: None,
            error: Some(error.into()),
        }
    }
}

/// Interface shared by the text-generation provider clients.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Perform one generation round trip. Infallible by contract: every
    /// failure mode is reported inside the returned [`GenerationResult`].
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult;

    /// The model used when [`GenerationOptions::model`] is unset.
    fn default_model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_builder_sets_fields() {
        let options = GenerationOptions::default()
            .with_model("gpt-4o")
            .with_system("Be terse.")
            .with_max_tokens(512)
            .with_temperature(0.2);

        assert_eq!(options.model.as_deref(), Some("gpt-4o"));
        assert_eq!(options.system.as_deref(), Some("Be terse."));
        assert_eq!(options.max_tokens, Some(512));
        assert_eq!(options.temperature, Some(0.2));
    }

    #[test]
    fn result_serializes_without_empty_fields() {
        let ok = GenerationResult::success("hi", "gpt-4o").with_usage(json!({"total_tokens": 3}));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["content"], "hi");
        assert!(value.get("error").is_none());

        let failed = GenerationResult::failure("boom");
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("content").is_none());
    }
}
