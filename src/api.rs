//! HTTP/JSON surface consumed by the browser UI.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::error::GuideError;
use crate::guide::Guide;
use crate::llm::ReasoningClient;
use crate::shape::{
    Category, CodingHelpResponse, ExplanationMode, Language, ServiceDetail, ServiceResult,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state
pub struct AppState {
    guide: Guide<Arc<dyn ReasoningClient>>,
}

impl AppState {
    pub fn new(llm: Arc<dyn ReasoningClient>) -> Self {
        Self {
            guide: Guide::new(llm),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/languages", get(languages))
        .route("/search", post(search))
        .route("/details", post(details))
        .route("/coding-help", post(coding_help))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub language: Language,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ServiceResult>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsRequest {
    pub service_name: String,
    pub language: Language,
    #[serde(default)]
    pub mode: ExplanationMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CodingHelpRequest {
    pub input: String,
    pub language: Language,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub name: Language,
    pub speech_locale: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
    pub modes: Vec<ExplanationMode>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// A [`GuideError`] rendered as an HTTP response.
pub struct ApiError(GuideError);

impl From<GuideError> for ApiError {
    fn from(e: GuideError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GuideError::EmptyInput { .. } => StatusCode::BAD_REQUEST,
            GuideError::Transport(_) | GuideError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            error!(error = %self.0, "guide operation failed");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

/// GET /api/v1/languages
///
/// Selector contents for the UI, including the speech-recognition locale per language.
async fn languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: Language::ALL
            .into_iter()
            .map(|name| LanguageInfo {
                name,
                speech_locale: name.speech_locale().to_string(),
            })
            .collect(),
        modes: ExplanationMode::ALL.to_vec(),
        categories: vec![
            Category::Government,
            Category::Healthcare,
            Category::Education,
            Category::Technical,
        ],
    })
}

/// POST /api/v1/search
async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = state.guide.search(&request.query, request.language).await?;
    Ok(Json(SearchResponse { results }))
}

/// POST /api/v1/details
async fn details(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DetailsRequest>,
) -> Result<Json<ServiceDetail>, ApiError> {
    let detail = state
        .guide
        .get_details(&request.service_name, request.language, request.mode)
        .await?;
    Ok(Json(detail))
}

/// POST /api/v1/coding-help
async fn coding_help(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CodingHelpRequest>,
) -> Result<Json<CodingHelpResponse>, ApiError> {
    let help = state
        .guide
        .get_coding_help(&request.input, request.language)
        .await?;
    Ok(Json(help))
}
