//! OpenAI Chat Completions client.
//!
//! One blocking-until-response HTTP POST per [`generate`](OpenAIClient::generate)
//! call; no retries, no caching. The request body matches the Chat Completions
//! wire shape exactly: `model`, `messages` (system + user), `max_tokens`,
//! `temperature`, authenticated with a bearer token.
//!
//! # Example
//!
//! ```rust,no_run
//! use sitellm::clients::openai::OpenAIClient;
//! use sitellm::generation::{GenerationClient, GenerationOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = OpenAIClient::new(std::env::var("OPENAI_API_KEY").ok());
//!     let result = client
//!         .generate("Say hello.", &GenerationOptions::default())
//!         .await;
//!     if result.success {
//!         println!("{}", result.content.unwrap());
//!     } else {
//!         eprintln!("{}", result.error.unwrap());
//!     }
//! }
//! ```

use crate::sitellm::generation::{
    GenerationClient, GenerationOptions, GenerationResult, DEFAULT_MAX_TOKENS,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
};
use async_trait::async_trait;
use log::error;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for OpenAI's `/v1/chat/completions` endpoint.
pub struct OpenAIClient {
    key: Option<String>,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a client. A `None` or empty key yields a client whose calls
    /// report a configuration failure without touching the network.
    pub fn new(key: Option<String>) -> Self {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Create a client pointing at an OpenAI-compatible base URL.
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
impl GenerationClient for OpenAIClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> GenerationResult {
        let key = match &self.key {
            Some(key) => key,
            None => return GenerationResult::failure("OpenAI API key not configured"),
        };

        let model = options.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let system = options.system.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let body = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "temperature": options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                error!("OpenAIClient::generate: transport error: {}", err);
                return GenerationResult::failure(err.to_string());
            }
        };

        let body: JsonValue = match response.json().await {
            Ok(body) => body,
            Err(_) => return GenerationResult::failure("Unknown error"),
        };

        match body["choices"][0]["message"]["content"].as_str() {
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
