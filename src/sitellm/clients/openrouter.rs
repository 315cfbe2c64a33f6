//! OpenRouter client.
//!
//! OpenRouter speaks the chat-completions dialect but expects an
//! `HTTP-Referer` header identifying the calling site, and this integration
//! sends only `model` and `messages` — token budget and temperature are left
//! to the routed provider's defaults. Responses carry no usage report.

use crate::sitellm::generation::{
    GenerationClient, GenerationOptions, GenerationResult, DEFAULT_SYSTEM_PROMPT,
};
use async_trait::async_trait;
use log::error;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
const DEFAULT_REFERER: &str = "https://localhost";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for OpenRouter's `/v1/chat/completions` endpoint.
pub struct OpenRouterClient {
    key: Option<String>,
    base_url: String,
    referer: String,
    http: reqwest::Client,
}

impl OpenRouterClient {
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
            referer: DEFAULT_REFERER.to_string(),
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Set the `HTTP-Referer` header value, normally the public URL of the
    /// site this core serves.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }
}

#[async_trait]
impl GenerationClient for OpenRouterClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult {
        let key = match &self.key {
            Some(key) => key,
            None => return GenerationResult::failure("OpenRouter API key not configured"),
        };

        let model = options.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let body = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": options.system.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)},
                {"role": "user", "content": prompt},
            ],
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .header("HTTP-Referer", &self.referer)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                error!("OpenRouterClient::generate: transport error: {}", err);
                return GenerationResult::failure(err.to_string());
            }
        };

        let body: JsonValue = match response.json().await {
            Ok(body) => body,
            Err(_) => return GenerationResult::failure("Unknown error"),
        };

        match body["choices"][0]["message"]["content"].as_str() {
            Some(content) => GenerationResult::success(content, model),
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
