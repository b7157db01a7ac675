//! Stand-in for the Gemini `generateContent` endpoint.
//!
//! Point the server at it with `CIVIC_LLM_API_BASE=http://127.0.0.1:8081`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use civic_guide::testing::fixtures;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone)]
struct AppState {
    attempt_count: Arc<AtomicUsize>,
    fail_attempts: usize,
}

/// Picks a canned payload from the shape of the requested schema.
fn canned_payload(schema: &Value) -> &'static str {
    let properties = &schema["properties"];
    match schema["type"].as_str() {
        Some("ARRAY") => fixtures::SCHOLARSHIP_RESULTS,
        Some("OBJECT") if properties.get("terms").is_some() => fixtures::TYPE_ERROR_HELP,
        Some("OBJECT") if properties.get("steps").is_some() => fixtures::AYUSHMAN_DETAIL,
        _ => "{}",
    }
}

async fn generate_content(
    State(state): State<AppState>,
    Path(model_action): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some((model, "generateContent")) = model_action.split_once(':') else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": format!("unknown action: {model_action}") } })),
        );
    };

    let attempt = state.attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    info!(attempt, model, "prompt preview: {}...", prompt.chars().take(120).collect::<String>());

    // Fail first N attempts to exercise decode failure handling
    let text = if attempt <= state.fail_attempts {
        info!("returning malformed JSON");
        r#"{"invalid": "json", missing_fields: true}"#
    } else {
        canned_payload(&body["generationConfig"]["responseSchema"])
    };

    let response = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    });
    (StatusCode::OK, Json(response))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let port = std::env::var("MOCK_LLM_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8081);

    let fail_attempts = std::env::var("MOCK_LLM_FAIL_ATTEMPTS")
        .ok()
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);

    let state = AppState {
        attempt_count: Arc::new(AtomicUsize::new(0)),
        fail_attempts,
    };

    let app = Router::new()
        .route("/v1beta/models/:model_action", post(generate_content))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Mock LLM server listening on http://{}", addr);
    info!("Will fail first {} attempt(s)", fail_attempts);

    axum::serve(listener, app).await?;
    Ok(())
}
