//! Generation tools: text via the dispatcher, images via Replicate.

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::sitellm::clients::replicate::ReplicateClient;
use crate::sitellm::dispatcher::{Dispatcher, DEFAULT_PROVIDER};
use crate::sitellm::generation::{
    GenerationOptions, GenerationResult, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use crate::sitellm::tool_protocol::{
    Envelope, RouterError, ToolDescriptor, ToolRouter, CORE_PRIORITY,
};
use crate::sitellm::tools::{required_str, str_or};

const CATEGORY: &str = "AI Generation";

/// Default Replicate model for image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "stability-ai/sdxl";

/// Register `ai_generate` and `image_generate` at [`CORE_PRIORITY`].
pub async fn register_generation_tools(
    router: &ToolRouter,
    dispatcher: Arc<Dispatcher>,
    replicate: Arc<ReplicateClient>,
) -> Result<(), RouterError> {
    router
        .register_with_priority(
            ToolDescriptor::new(
                "ai_generate",
                "Generate content using specified AI provider (openai, anthropic, openrouter).",
            )
            .with_category(CATEGORY)
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "prompt": { "type": "string", "description": "The prompt to send" },
                    "provider": { "type": "string", "enum": ["openai", "anthropic", "openrouter"], "default": DEFAULT_PROVIDER },
                    "model": { "type": "string", "description": "Model to use (provider-specific)" },
                    "system": { "type": "string", "description": "System prompt" },
                    "max_tokens": { "type": "integer", "default": DEFAULT_MAX_TOKENS },
                    "temperature": { "type": "number", "default": DEFAULT_TEMPERATURE },
                },
                "required": ["prompt"],
            })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let dispatcher = Arc::clone(&dispatcher);
                Box::pin(async move { ai_generate(&dispatcher, args).await })
            }),
        )
        .await?;

    router
        .register_with_priority(
            ToolDescriptor::new("image_generate", "Generate images using Replicate models.")
                .with_category(CATEGORY)
                .with_schema(json!({
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string", "description": "Image generation prompt" },
                        "model": { "type": "string", "description": "Replicate model ID", "default": DEFAULT_IMAGE_MODEL },
                        "width": { "type": "integer", "default": 1024 },
                        "height": { "type": "integer", "default": 1024 },
                        "negative_prompt": { "type": "string", "description": "What to avoid" },
                    },
                    "required": ["prompt"],
                })),
            CORE_PRIORITY,
            Arc::new(move |args| {
                let replicate = Arc::clone(&replicate);
                Box::pin(async move { image_generate(&replicate, args).await })
            }),
        )
        .await?;

    Ok(())
}

async fn ai_generate(dispatcher: &Dispatcher, args: JsonValue) -> Envelope {
    let prompt = match required_str(&args, "prompt") {
        Ok(prompt) => prompt,
        Err(envelope) => return envelope,
    };
    let provider = str_or(&args, "provider", DEFAULT_PROVIDER);

    let mut options = GenerationOptions::default();
    if let Some(model) = args.get("model").and_then(JsonValue::as_str) {
        options = options.with_model(model);
    }
    if let Some(system) = args.get("system").and_then(JsonValue::as_str) {
        options = options.with_system(system);
    }
    if let Some(max_tokens) = args.get("max_tokens").and_then(JsonValue::as_u64) {
        options = options.with_max_tokens(max_tokens as u32);
    }
    if let Some(temperature) = args.get("temperature").and_then(JsonValue::as_f64) {
        options = options.with_temperature(temperature);
    }

    let result = dispatcher.execute(provider, prompt, options).await;
    generation_envelope(result)
}

fn generation_envelope(result: GenerationResult) -> Envelope {
    if result.success {
        let mut data = json!({
            "content": result.content,
            "model": result.model,
        });
        if let Some(usage) = result.usage {
            data["usage"] = usage;
        }
        Envelope::ok().with_data(data)
    } else {
        Envelope::error(result.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}

async fn image_generate(replicate: &ReplicateClient, args: JsonValue) -> Envelope {
    let prompt = match required_str(&args, "prompt") {
        Ok(prompt) => prompt,
        Err(envelope) => return envelope,
    };
    let model = str_or(&args, "model", DEFAULT_IMAGE_MODEL);
    let input = json!({
        "prompt": prompt,
        "width": args.get("width").and_then(JsonValue::as_u64).unwrap_or(1024),
        "height": args.get("height").and_then(JsonValue::as_u64).unwrap_or(1024),
        "negative_prompt": str_or(&args, "negative_prompt", ""),
    });

    let result = replicate.predict(model, &input).await;
    if result.success {
        Envelope::ok().with_data(json!({
            "output": result.output,
            "model": result.model,
        }))
    } else {
        Envelope::error(result.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}
