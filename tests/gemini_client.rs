//! GeminiClient wire format, checked against an in-process HTTP stub.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use civic_guide::prompt::{build_search_request, InputText};
use civic_guide::{GeminiClient, Language, LlmError, ReasoningClient};

#[derive(Clone, Default)]
struct Captured {
    calls: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

/// Spawns a stub answering every call with `status` and `reply`; returns its base URL.
async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();
    let state = (captured.clone(), status, reply);

    let app = Router::new()
        .route(
            "/v1beta/models/:model_action",
            post(
                |State((captured, status, reply)): State<(Captured, StatusCode, Value)>,
                 Path(model_action): Path<String>,
                 headers: HeaderMap,
                 Json(body): Json<Value>| async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    captured.calls.lock().unwrap().push((model_action, key, body));
                    (status, Json(reply))
                },
            ),
        )
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), captured)
}

fn search_request() -> civic_guide::prompt::GenerationRequest {
    let query = InputText::parse("Apply for scholarship", "query").unwrap();
    build_search_request(&query, Language::English)
}

#[tokio::test]
async fn test_generate_sends_instruction_schema_and_key() {
    let reply = json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": "[]"}]}}]
    });
    let (base, captured) = spawn_stub(StatusCode::OK, reply).await;
    let client = GeminiClient::new("test-key", "gemini-test").with_api_base(base);

    let request = search_request();
    let payload = client.generate(&request).await.unwrap();
    assert_eq!(payload.as_deref(), Some("[]"));

    let calls = captured.calls.lock().unwrap();
    let (model_action, key, body) = &calls[0];
    assert_eq!(model_action, "gemini-test:generateContent");
    assert_eq!(key.as_deref(), Some("test-key"));
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], request.instruction.as_str());
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    assert_eq!(
        body["generationConfig"]["responseSchema"]["items"]["required"],
        json!(["name", "description", "officialUrl", "category", "whyRecommended"])
    );
}

#[tokio::test]
async fn test_no_candidates_is_absent_payload() {
    let (base, _) = spawn_stub(StatusCode::OK, json!({"candidates": []})).await;
    let client = GeminiClient::new("k", "gemini-test").with_api_base(base);
    assert_eq!(client.generate(&search_request()).await.unwrap(), None);
}

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let reply = json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}});
    let (base, _) = spawn_stub(StatusCode::BAD_REQUEST, reply).await;
    let client = GeminiClient::new("", "gemini-test").with_api_base(base);

    let err = client.generate(&search_request()).await.unwrap_err();
    match err {
        LlmError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.starts_with("API key not valid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GeminiClient::new("k", "gemini-test").with_api_base(format!("http://{}", addr));
    let err = client.generate(&search_request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Http(_)));
}
