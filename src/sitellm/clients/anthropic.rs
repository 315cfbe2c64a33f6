//! Anthropic Messages API client.
//!
//! Same single-shot contract as the other clients, but the wire shape differs
//! from the chat-completions family: the system prompt rides in a top-level
//! `system` field, authentication uses the `x-api-key` header plus a pinned
//! `anthropic-version`, and the body carries no temperature field.

use crate::sitellm::generation::{
    GenerationClient, GenerationOptions, GenerationResult, DEFAULT_MAX_TOKENS,
    DEFAULT_SYSTEM_PROMPT,
};
use async_trait::async_trait;
use log::error;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for Anthropic's `/v1/messages` endpoint.
pub struct AnthropicClient {
    key: Option<String>,
    base_url: String,
    http: reqwest::Client,
}

impl AnthropicClient {
    /// Create a client. A `None` or empty key yields a client whose calls
    /// report a configuration failure without touching the network.
    pub fn new(key: Option<String>) -> Self {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Create a client pointing at an alternative base URL.
    pub fn with_base_url(key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            key: key.filter(|k| !k.is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl GenerationClient for AnthropicClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult {
        let key = match &self.key {
            Some(key) => key,
            None => return GenerationResult::failure("Anthropic API key not configured"),
        };

        let model = options.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let body = json!({
            "model": model,
            "system": options.system.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT),
            "messages": [
                {"role": "user", "content": prompt},
            ],
            "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                error!("AnthropicClient::generate: transport error: {}", err);
                return GenerationResult::failure(err.to_string());
            }
        };

        let body: JsonValue = match response.json().await {
            Ok(body) => body,
            Err(_) => return GenerationResult::failure("Unknown error"),
        };

        match body["content"][0]["text"].as_str() {
            Some(content) => GenerationResult::success(content, model)
                .with_usage(body.get("usage").cloned().unwrap_or_else(|| json!({}))),
            None => GenerationResult::failure(
                body["error"]["message"]
                    .as_str()
                    .unwrap_or("Unknown error"),
            ),
        }
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }
}
