//! Clients for the external reasoning service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{LlmBackend, LlmConfig};
use crate::prompt::GenerationRequest;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("unreadable response envelope: {0}")]
    Envelope(String),
}

/// Sends an instruction plus its output contract and returns the raw text payload.
///
/// `Ok(None)` means the service answered without any text.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    fn model(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, LlmError>;
}

#[async_trait]
impl<C: ReasoningClient + ?Sized> ReasoningClient for Arc<C> {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, LlmError> {
        (**self).generate(request).await
    }
}

/// Builds the client selected by configuration.
pub fn build_client(config: &LlmConfig) -> Arc<dyn ReasoningClient> {
    match config.backend {
        LlmBackend::Gemini => {
            let mut client = GeminiClient::new(
                config.api_key.clone().unwrap_or_default(),
                config.model.clone().unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            );
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base.clone());
            }
            Arc::new(client)
        }
        LlmBackend::Ollama => {
            let mut client = OllamaClient::new(
                config.model.clone().unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            );
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base.clone());
            }
            Arc::new(client)
        }
    }
}

fn http_client() -> Client {
    Client::builder()
        .http1_only()
        .build()
        .unwrap_or_else(|_| Client::new())
}

async fn error_from_response(resp: reqwest::Response) -> LlmError {
    #[derive(Deserialize)]
    struct ApiErrorBody {
        error: ApiErrorDetail,
    }

    #[derive(Deserialize)]
    struct ApiErrorDetail {
        message: String,
    }

    let status = resp.status().as_u16();
    let error_text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&error_text)
        .map(|e| e.error.message)
        .unwrap_or(error_text);
    LlmError::Api { status, message }
}

// ============================================================================
// Gemini
// ============================================================================

/// Google Generative Language API client (`generateContent`).
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_GEMINI_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl ReasoningClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, LlmError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: &request.instruction,
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.schema.to_gemini_schema(),
            },
        };

        let url = self.endpoint();
        debug!(model = %self.model, %url, "calling generateContent");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let parsed: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Envelope(e.to_string()))?;
        Ok(parsed.into_text())
    }
}

// ============================================================================
// Ollama
// ============================================================================

/// Local Ollama server client using structured outputs (`format` schema).
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    model: String,
    api_base: String,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            model: model.into(),
            api_base: DEFAULT_OLLAMA_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl ReasoningClient for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, LlmError> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: String,
            stream: bool,
            format: Value,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            #[serde(default)]
            response: String,
        }

        let url = format!("{}/api/generate", self.api_base.trim_end_matches('/'));
        debug!(model = %self.model, %url, "calling ollama");

        let resp = self
            .http
            .post(&url)
            .header("Connection", "close")
            .json(&OllamaRequest {
                model: &self.model,
                prompt: ollama_prompt(request),
                stream: false,
                format: request.schema.to_json_schema(),
            })
            .send()
            .await
            .map_err(|e| LlmError::Http(format!("{e}. URL: {url}")))?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let body: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Envelope(e.to_string()))?;
        let cleaned = clean_json_response(&body.response);
        Ok((!cleaned.is_empty()).then_some(cleaned))
    }
}

// Small local models follow the schema more reliably when it is also spelled out in the prompt.
fn ollama_prompt(request: &GenerationRequest) -> String {
    let mut s = String::new();
    s.push_str("You are a system that strictly outputs JSON.\n");
    s.push_str("You must produce JSON that matches this schema:\n\n");
    s.push_str(&request.schema.describe());
    s.push_str("\nThe JSON must be parseable and not contain comments or explanations.\n");
    s.push_str("Do not wrap it in markdown code fences.\n\n");
    s.push_str(&request.instruction);
    s
}

/// Removes markdown code fences and surrounding whitespace.
fn clean_json_response(response: &str) -> String {
    let mut cleaned = response.trim();

    if cleaned.starts_with("```") {
        if let Some(start_idx) = cleaned.find('\n') {
            cleaned = &cleaned[start_idx + 1..];
        } else {
            cleaned = &cleaned[3..];
        }

        if cleaned.ends_with("```") {
            cleaned = &cleaned[..cleaned.len() - 3];
        }
    }

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::service_detail_typedef;

    #[test]
    fn test_clean_json_response_strips_fences() {
        assert_eq!(clean_json_response("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(clean_json_response("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(clean_json_response("```[]```"), "[]");
    }

    #[test]
    fn test_gemini_endpoint() {
        let client = GeminiClient::new("k", "gemini-test").with_api_base("http://127.0.0.1:9/");
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_gemini_response_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"a\""},{"text":":1}]"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some(r#"[{"a":1}]"#));

        let empty: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[test]
    fn test_ollama_prompt_spells_out_schema() {
        let request = GenerationRequest {
            instruction: "Explain.".to_string(),
            schema: service_detail_typedef(),
        };
        let prompt = ollama_prompt(&request);
        assert!(prompt.contains("- steps: array of:"));
        assert!(prompt.ends_with("Explain."));
    }

    #[test]
    fn test_build_client_defaults() {
        let gemini = build_client(&LlmConfig::default());
        assert_eq!(gemini.model(), DEFAULT_GEMINI_MODEL);

        let ollama = build_client(&LlmConfig {
            backend: LlmBackend::Ollama,
            ..LlmConfig::default()
        });
        assert_eq!(ollama.model(), DEFAULT_OLLAMA_MODEL);
    }
}
