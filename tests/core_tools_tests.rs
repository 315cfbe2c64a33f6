use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use sitellm::clients::anthropic::AnthropicClient;
use sitellm::clients::openai::OpenAIClient;
use sitellm::clients::openrouter::OpenRouterClient;
use sitellm::clients::replicate::ReplicateClient;
use sitellm::config::ProviderKeys;
use sitellm::options::MemoryOptions;
use sitellm::tool_protocol::{Envelope, RouterError, ToolDescriptor};
use sitellm::tools::register_core_tools;
use sitellm::{Dispatcher, MemoryStore, ProjectContextStore, ToolRouter};

/// Router wired with the core tools over in-memory state and unconfigured
/// provider keys.
async fn core_router() -> ToolRouter {
    core_router_with(
        Arc::new(Dispatcher::new(&ProviderKeys::default())),
        Arc::new(ReplicateClient::new(None)),
    )
    .await
}

async fn core_router_with(
    dispatcher: Arc<Dispatcher>,
    replicate: Arc<ReplicateClient>,
) -> ToolRouter {
    let options = Arc::new(MemoryOptions::new());
    let router = ToolRouter::new();
    register_core_tools(
        &router,
        Arc::new(MemoryStore::new(options.clone())),
        dispatcher,
        replicate,
        Arc::new(ProjectContextStore::new(options)),
    )
    .await
    .unwrap();
    router
}

async fn spawn_stub(base_path: &str, reply: Value) -> String {
    let app = Router::new().route(
        base_path,
        post(move || {
            let reply = reply.clone();
            async move { Json(reply) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn core_registration_lists_all_nine_tools_in_order() {
    let router = core_router().await;
    let names: Vec<String> = router
        .list_tools()
        .await
        .into_iter()
        .map(|d| d.name)
        .collect();

    assert_eq!(
        names,
        vec![
            "memory_set",
            "memory_get",
            "memory_search",
            "memory_list",
            "memory_delete",
            "ai_generate",
            "image_generate",
            "load_project_context",
            "save_project_context",
        ]
    );
}

#[tokio::test]
async fn descriptors_carry_categories_and_schemas() {
    let router = core_router().await;
    let tools = router.list_tools().await;

    let memory_set = tools.iter().find(|d| d.name == "memory_set").unwrap();
    assert_eq!(memory_set.category, "Memory System");
    assert_eq!(memory_set.input_schema["required"], json!(["key", "value"]));

    let ai_generate = tools.iter().find(|d| d.name == "ai_generate").unwrap();
    assert_eq!(ai_generate.category, "AI Generation");
    assert_eq!(
        ai_generate.input_schema["properties"]["provider"]["enum"],
        json!(["openai", "anthropic", "openrouter"])
    );
}

#[tokio::test]
async fn memory_round_trip_through_the_router() {
    let router = core_router().await;

    let envelope = router
        .dispatch(
            "memory_set",
            json!({"key": "city", "value": "Paris", "context": "travel"}),
        )
        .await
        .unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Memory stored"));

    let envelope = router
        .dispatch("memory_get", json!({"key": "city", "context": "travel"}))
        .await
        .unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.data, Some(json!("Paris")));

    let envelope = router
        .dispatch(
            "memory_search",
            json!({"query": "par", "context": "travel"}),
        )
        .await
        .unwrap();
    assert!(envelope.success);
    let hits = envelope.data.unwrap();
    assert_eq!(hits[0]["key"], "city");
    assert_eq!(hits[0]["value"], "Paris");

    let envelope = router
        .dispatch("memory_delete", json!({"key": "city", "context": "travel"}))
        .await
        .unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Memory deleted"));

    let envelope = router
        .dispatch("memory_get", json!({"key": "city", "context": "travel"}))
        .await
        .unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.data, Some(json!(null)));
}

#[tokio::test]
async fn memory_set_decodes_json_string_values() {
    let router = core_router().await;

    router
        .dispatch(
            "memory_set",
            json!({"key": "profile", "value": "{\"name\": \"Ada\"}"}),
        )
        .await
        .unwrap();

    let envelope = router
        .dispatch("memory_get", json!({"key": "profile"}))
        .await
        .unwrap();
    assert_eq!(envelope.data, Some(json!({"name": "Ada"})));

    // Non-JSON text stays a plain string.
    router
        .dispatch(
            "memory_set",
            json!({"key": "note", "value": "just some text"}),
        )
        .await
        .unwrap();
    let envelope = router
        .dispatch("memory_get", json!({"key": "note"}))
        .await
        .unwrap();
    assert_eq!(envelope.data, Some(json!("just some text")));
}

#[tokio::test]
async fn memory_list_defaults_to_global_context() {
    let router = core_router().await;
    router
        .dispatch("memory_set", json!({"key": "a", "value": "1"}))
        .await
        .unwrap();

    let envelope = router.dispatch("memory_list", json!({})).await.unwrap();
    assert!(envelope.success);
    let data = envelope.data.unwrap();
    assert_eq!(data["a"]["value"], json!(1));
}

#[tokio::test]
async fn memory_delete_of_absent_key_reports_not_found() {
    let router = core_router().await;
    let envelope = router
        .dispatch("memory_delete", json!({"key": "ghost"}))
        .await
        .unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Memory not found"));
}

#[tokio::test]
async fn missing_required_argument_yields_error_envelope() {
    let router = core_router().await;

    let envelope = router.dispatch("memory_set", json!({"key": "x"})).await.unwrap();
    assert!(!envelope.success);
    assert_eq!(
        envelope.error.as_deref(),
        Some("missing required argument: value")
    );

    let envelope = router.dispatch("ai_generate", json!({})).await.unwrap();
    assert_eq!(
        envelope.error.as_deref(),
        Some("missing required argument: prompt")
    );
}

#[tokio::test]
async fn ai_generate_without_keys_reports_configuration_error() {
    let router = core_router().await;

    let envelope = router
        .dispatch("ai_generate", json!({"prompt": "hi"}))
        .await
        .unwrap();
    assert!(!envelope.success);
    assert_eq!(
        envelope.error.as_deref(),
        Some("OpenAI API key not configured")
    );

    let envelope = router
        .dispatch("ai_generate", json!({"prompt": "hi", "provider": "anthropic"}))
        .await
        .unwrap();
    assert_eq!(
        envelope.error.as_deref(),
        Some("Anthropic API key not configured")
    );
}

#[tokio::test]
async fn ai_generate_returns_content_and_model() {
    let base = spawn_stub(
        "/chat/completions",
        json!({
            "choices": [{"message": {"content": "generated text"}}],
            "usage": {"total_tokens": 9},
        }),
    )
    .await;
    let dispatcher = Dispatcher::from_clients(
        OpenAIClient::with_base_url(Some("k".into()), base),
        AnthropicClient::new(None),
        OpenRouterClient::new(None),
    );
    let router = core_router_with(Arc::new(dispatcher), Arc::new(ReplicateClient::new(None))).await;

    let envelope = router
        .dispatch("ai_generate", json!({"prompt": "write something"}))
        .await
        .unwrap();

    assert!(envelope.success);
    let data = envelope.data.unwrap();
    assert_eq!(data["content"], "generated text");
    assert_eq!(data["model"], "gpt-4o");
    assert_eq!(data["usage"]["total_tokens"], 9);
}

#[tokio::test]
async fn image_generate_polls_replicate_with_image_defaults() {
    // Submit returns the poll URL; the first poll succeeds.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let poll_base = base.clone();
    let app = Router::new()
        .route(
            "/predictions",
            post(move |Json(body): Json<Value>| {
                let poll_base = poll_base.clone();
                async move {
                    // The image tool fills prompt plus fixed dimensions.
                    assert_eq!(body["model"], "stability-ai/sdxl");
                    assert_eq!(body["input"]["prompt"], "a lighthouse");
                    assert_eq!(body["input"]["width"], 1024);
                    assert_eq!(body["input"]["height"], 1024);
                    assert_eq!(body["input"]["negative_prompt"], "");
                    Json(json!({
                        "id": "p1",
                        "urls": {"get": format!("{}/predictions/p1", poll_base)},
                    }))
                }
            }),
        )
        .route(
            "/predictions/p1",
            get(|| async {
                Json(json!({"status": "succeeded", "output": ["https://img/1.png"]}))
            }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let replicate = ReplicateClient::with_base_url(Some("r8".into()), &base)
        .with_poll_interval(std::time::Duration::from_millis(10));
    let router = core_router_with(
        Arc::new(Dispatcher::new(&ProviderKeys::default())),
        Arc::new(replicate),
    )
    .await;

    let envelope = router
        .dispatch("image_generate", json!({"prompt": "a lighthouse"}))
        .await
        .unwrap();

    assert!(envelope.success);
    let data = envelope.data.unwrap();
    assert_eq!(data["output"], json!(["https://img/1.png"]));
    assert_eq!(data["model"], "stability-ai/sdxl");
}

#[tokio::test]
async fn project_context_save_and_load() {
    let router = core_router().await;

    let envelope = router
        .dispatch(
            "save_project_context",
            json!({"project_id": "blog", "context": "{\"skills\": [\"writing\"]}"}),
        )
        .await
        .unwrap();
    assert!(envelope.success);
    assert_eq!(
        envelope.message.as_deref(),
        Some("Saved project context for blog")
    );

    let envelope = router
        .dispatch("load_project_context", json!({"project_id": "blog"}))
        .await
        .unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.data, Some(json!({"skills": ["writing"]})));
    assert_eq!(
        envelope.message.as_deref(),
        Some("Loaded project context for blog")
    );
}

#[tokio::test]
async fn project_context_falls_back_to_raw_string() {
    let router = core_router().await;

    router
        .dispatch(
            "save_project_context",
            json!({"project_id": "notes", "context": "not valid json"}),
        )
        .await
        .unwrap();

    let envelope = router
        .dispatch("load_project_context", json!({"project_id": "notes"}))
        .await
        .unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.data, Some(json!("not valid json")));
}

#[tokio::test]
async fn loading_unknown_project_reports_no_context() {
    let router = core_router().await;

    let envelope = router
        .dispatch("load_project_context", json!({"project_id": "nowhere"}))
        .await
        .unwrap();
    assert!(!envelope.success);
    assert_eq!(
        envelope.message.as_deref(),
        Some("No saved context for nowhere")
    );
}

#[tokio::test]
async fn extensions_register_after_core_and_cannot_shadow_it() {
    let router = core_router().await;

    // A site extension contributes its own tool at the default priority.
    router
        .register(
            ToolDescriptor::new("draft_post", "Draft a blog post").with_category("Site"),
            Arc::new(|_args| Box::pin(async { Envelope::ok().with_message("drafted") })),
        )
        .await
        .unwrap();

    let names: Vec<String> = router
        .list_tools()
        .await
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names.len(), 10);
    assert_eq!(names.last().map(String::as_str), Some("draft_post"));

    assert!(router.contains("draft_post").await);
    let envelope = router.dispatch("draft_post", json!({})).await.unwrap();
    assert_eq!(envelope.message.as_deref(), Some("drafted"));

    // Core names cannot be re-registered by an extension.
    let err = router
        .register(
            ToolDescriptor::new("memory_set", "Shadow"),
            Arc::new(|_args| Box::pin(async { Envelope::fail() })),
        )
        .await
        .unwrap_err();
    assert_eq!(err, RouterError::DuplicateName("memory_set".to_string()));
}

#[tokio::test]
async fn dispatching_an_unknown_tool_is_a_router_error() {
    let router = core_router().await;
    let err = router.dispatch("no_such_tool", json!({})).await.unwrap_err();
    assert_eq!(err, RouterError::NotFound("no_such_tool".to_string()));
}
