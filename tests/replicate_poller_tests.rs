use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use sitellm::clients::replicate::ReplicateClient;

#[derive(Clone)]
struct StubState {
    base: String,
    polls: Arc<AtomicU32>,
    /// Status body returned once the poll counter reaches this attempt;
    /// `None` keeps the prediction processing forever.
    terminal: Option<(u32, Value)>,
}

/// Serve a prediction endpoint that stays "processing" until `terminal`
/// kicks in. Returns the base URL and the GET-poll counter.
async fn spawn_replicate(terminal: Option<(u32, Value)>) -> (String, Arc<AtomicU32>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let polls = Arc::new(AtomicU32::new(0));

    let state = StubState {
        base: base.clone(),
        polls: Arc::clone(&polls),
        terminal,
    };
    let app = Router::new()
        .route(
            "/predictions",
            post(|State(state): State<StubState>| async move {
                Json(json!({
                    "id": "pred-1",
                    "status": "starting",
                    "urls": {"get": format!("{}/predictions/pred-1", state.base)},
                }))
            }),
        )
        .route(
            "/predictions/pred-1",
            get(|State(state): State<StubState>| async move {
                let attempt = state.polls.fetch_add(1, Ordering::SeqCst) + 1;
                match &state.terminal {
                    Some((at, body)) if attempt >= *at => Json(body.clone()),
                    _ => Json(json!({"status": "processing"})),
                }
            }),
        )
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base, polls)
}

fn fast_client(base: &str) -> ReplicateClient {
    ReplicateClient::with_base_url(Some("r8-test".into()), base)
        .with_poll_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn polls_until_success() {
    let terminal = json!({"status": "succeeded", "output": ["https://img/1.png"]});
    let (base, polls) = spawn_replicate(Some((3, terminal))).await;

    let result = fast_client(&base)
        .predict("stability-ai/sdxl", &json!({"prompt": "a lighthouse"}))
        .await;

    assert!(result.success);
    assert_eq!(result.output, Some(json!(["https://img/1.png"])));
    assert_eq!(result.model.as_deref(), Some("stability-ai/sdxl"));
    assert_eq!(polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_prediction_reports_its_error() {
    let terminal = json!({"status": "failed", "error": "NSFW content detected"});
    let (base, _) = spawn_replicate(Some((1, terminal))).await;

    let result = fast_client(&base)
        .predict("stability-ai/sdxl", &json!({"prompt": "x"}))
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("NSFW content detected"));
    assert_eq!(result.output, None);
}

#[tokio::test]
async fn failed_prediction_without_detail_gets_generic_error() {
    let terminal = json!({"status": "failed"});
    let (base, _) = spawn_replicate(Some((1, terminal))).await;

    let result = fast_client(&base)
        .predict("stability-ai/sdxl", &json!({"prompt": "x"}))
        .await;

    assert_eq!(result.error.as_deref(), Some("Prediction failed"));
}

#[tokio::test]
async fn exhausted_attempt_budget_is_a_timeout() {
    let (base, polls) = spawn_replicate(None).await;

    let result = fast_client(&base)
        .with_max_attempts(5)
        .predict("stability-ai/sdxl", &json!({"prompt": "x"}))
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Prediction timeout"));
    assert_eq!(polls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn submit_rejection_surfaces_detail() {
    let app = Router::new().route(
        "/predictions",
        post(|| async { Json(json!({"detail": "Invalid version or not permitted"})) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let result = fast_client(&base)
        .predict("bad/model", &json!({"prompt": "x"}))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Invalid version or not permitted")
    );
}

#[tokio::test]
async fn missing_key_fails_without_network() {
    let result = ReplicateClient::new(None)
        .predict("stability-ai/sdxl", &json!({"prompt": "x"}))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Replicate API key not configured")
    );
}

#[tokio::test]
async fn cancellation_aborts_the_poll_loop() {
    let (base, _) = spawn_replicate(None).await;
    let client = ReplicateClient::with_base_url(Some("r8-test".into()), &base)
        .with_poll_interval(Duration::from_millis(50))
        .with_max_attempts(1000);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = client
        .predict_with_cancellation("stability-ai/sdxl", &json!({"prompt": "x"}), cancel)
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Prediction cancelled"));
    // Nowhere near the 50-second attempt budget.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn default_poll_cadence() {
    let client = ReplicateClient::new(Some("r8".into()));
    assert_eq!(client.poll_interval(), Duration::from_secs(2));
    assert_eq!(client.max_attempts(), 60);
}
