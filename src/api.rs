use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shuttle_axum::axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::metrics::Metrics;
use crate::pipeline::{BriefingPipeline, SourceType};

const SAMPLE_HEADLINE: &str = "Breaking: Major tech company announces new AI breakthrough";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BriefingPipeline>,
}

impl AppState {
    pub fn new(pipeline: BriefingPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the HTTP router. `/metrics` is served from the process-wide recorder.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate-news-audio", post(generate_news_audio))
        .route("/test-llm", post(test_llm))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(Metrics::init().router())
}

#[derive(Debug, Deserialize)]
pub struct GenerateReq {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, alias = "sourceType")]
    pub source_type: SourceType,
}

#[derive(Serialize)]
struct HealthResp {
    status: &'static str,
    message: &'static str,
}

async fn health() -> Json<HealthResp> {
    Json(HealthResp {
        status: "healthy",
        message: "Server is running",
    })
}

async fn generate_news_audio(
    State(state): State<AppState>,
    Json(body): Json<GenerateReq>,
) -> Response {
    match state.pipeline.run(&body.topics, body.source_type).await {
        Ok(artifact) => {
            let disposition = format!("attachment; filename={}", artifact.filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, artifact.mime.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                artifact.bytes,
            )
                .into_response()
        }
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({ "detail": e.to_string() }))).into_response()
        }
    }
}

async fn test_llm(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.pipeline.summarizer().summarize(SAMPLE_HEADLINE).await {
        Ok(summary) => Json(json!({ "status": "success", "summary": summary })),
        Err(e) => {
            let message = format!("{e:#}");
            warn!(error = %message, "text generation self-test failed");
            Json(json!({ "status": "error", "message": message }))
        }
    }
}
