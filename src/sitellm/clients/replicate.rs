//! Replicate prediction client.
//!
//! Replicate runs jobs asynchronously: a POST creates the prediction and the
//! client then polls the returned status URL until the job reaches a terminal
//! state. The poll cadence is a fixed 2-second suspension with a hard budget
//! of 60 attempts (roughly two minutes wall-clock); the wait suspends the task
//! rather than blocking a thread, and callers that do not want to ride out the
//! full budget can pass a [`CancellationToken`].
//!
//! # Example
//!
//! ```rust,no_run
//! use sitellm::clients::replicate::ReplicateClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ReplicateClient::new(std::env::var("REPLICATE_API_KEY").ok());
//!     let result = client
//!         .predict("stability-ai/sdxl", &json!({"prompt": "a lighthouse at dusk"}))
//!         .await;
//!     match result.output {
//!         Some(output) => println!("{}", output),
//!         None => eprintln!("{}", result.error.unwrap_or_default()),
//!     }
//! }
//! ```

use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLL_ATTEMPTS: u32 = 60;

/// Outcome of a prediction run.
///
/// `output` holds whatever JSON the model produced (image URLs for the
/// diffusion models this core targets). Jobs are never persisted: if the
/// caller goes away mid-poll, the result is lost.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResult {
    fn success(output: JsonValue, model: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output),
            model: Some(model.into()),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            model: None,
            error: Some(error.into()),
        }
    }
}

/// Client for Replicate's `/v1/predictions` endpoint with status polling.
pub struct ReplicateClient {
    key: Option<String>,
    base_url: String,
    http: reqwest::Client,
    poll_interval: Duration,
    max_attempts: u32,
}

impl ReplicateClient {
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
                .timeout(SUBMIT_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            poll_interval: POLL_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }

    /// Override the fixed sleep between status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the poll attempt budget.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// The sleep between status checks (2 seconds unless overridden).
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The poll attempt budget (60 unless overridden).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Submit a prediction and poll it to completion.
    pub async fn predict(&self, model: &str, input: &JsonValue) -> PredictionResult {
        self.predict_with_cancellation(model, input, CancellationToken::new())
            .await
    }

    /// Submit a prediction and poll it to completion, aborting early when
    /// `cancel` fires. Cancellation resolves promptly with a failure result
    /// instead of waiting out the attempt budget.
    pub async fn predict_with_cancellation(
        &self,
        model: &str,
        input: &JsonValue,
        cancel: CancellationToken,
    ) -> PredictionResult {
        let key = match &self.key {
            Some(key) => key,
            None => return PredictionResult::failure("Replicate API key not configured"),
        };

        let response = self
            .http
            .post(format!("{}/predictions", self.base_url))
            .header("Authorization", format!("Token {}", key))
            .json(&json!({"model": model, "input": input}))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                error!("ReplicateClient::predict: transport error: {}", err);
                return PredictionResult::failure(err.to_string());
            }
        };

        let body: JsonValue = match response.json().await {
            Ok(body) => body,
            Err(_) => return PredictionResult::failure("Unknown error"),
        };

        let poll_url = match (body["id"].as_str(), body["urls"]["get"].as_str()) {
            (Some(_), Some(url)) => url.to_string(),
            _ => {
                return PredictionResult::failure(
                    body["detail"].as_str().unwrap_or("Unknown error"),
                )
            }
        };

        for attempt in 0..self.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("ReplicateClient::predict: cancelled after {} polls", attempt);
                    return PredictionResult::failure("Prediction cancelled");
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let status_body: JsonValue = match self
                .http
                .get(&poll_url)
                .header("Authorization", format!("Token {}", key))
                .send()
                .await
            {
                Ok(response) => match response.json().await {
                    Ok(body) => body,
                    // A garbled status body counts as a spent attempt.
                    Err(err) => {
                        debug!("ReplicateClient::predict: bad status body: {}", err);
                        continue;
                    }
                },
                Err(err) => {
                    debug!("ReplicateClient::predict: poll transport error: {}", err);
                    continue;
                }
            };

            match status_body["status"].as_str() {
                Some("succeeded") => {
                    return PredictionResult::success(status_body["output"].clone(), model);
                }
                Some("failed") => {
                    return PredictionResult::failure(
                        status_body["error"].as_str().unwrap_or("Prediction failed"),
                    );
                }
                // "starting", "processing", or anything unrecognized: keep polling.
                _ => {}
            }
        }

        PredictionResult::failure("Prediction timeout")
    }
}
