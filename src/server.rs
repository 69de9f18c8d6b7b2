use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::{validate_tolerance, Config};
use crate::report::{build_comparison, build_report, AnalyticsReport, ComparisonView};
use crate::responses::SurveyData;
use crate::source::{SourceError, SurveySource, SurveySummary};

#[derive(Clone)]
struct ApiState {
    config: Config,
    source: Arc<dyn SurveySource>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    generated_at: DateTime<Utc>,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(error: SourceError) -> Self {
        let status = match &error {
            SourceError::NotFound(_) => StatusCode::NOT_FOUND,
            SourceError::Unavailable(_) | SourceError::Decode(_) | SourceError::Io(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        if status != StatusCode::NOT_FOUND {
            warn!("survey source failed: {error}");
        }
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Default, Deserialize)]
struct ToleranceQuery {
    tolerance: Option<f64>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    source: String,
}

#[derive(Debug, Serialize)]
struct SurveysResponse {
    surveys: Vec<SurveySummary>,
}

pub fn build_router(config: Config, source: Arc<dyn SurveySource>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/surveys", get(list_surveys))
        .route("/v1/surveys/:survey_id/analytics", get(survey_analytics))
        .route("/v1/surveys/:survey_id/comparison", get(survey_comparison))
        .route("/v1/analytics", post(inline_analytics))
        .route("/v1/comparison", post(inline_comparison))
        .layer(cors)
        .with_state(ApiState { config, source })
}

pub async fn run_server(config: Config, source: Arc<dyn SurveySource>, bind: SocketAddr) -> Result<()> {
    let app = build_router(config, source);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<ApiState>) -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.name().to_string(),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    let mut config = state.config;
    if !config.source.api_key.is_empty() {
        config.source.api_key = "***".to_string();
    }
    ok(config)
}

async fn list_surveys(State(state): State<ApiState>) -> ApiResult<SurveysResponse> {
    let surveys = state.source.list_surveys().await?;
    Ok(ok(SurveysResponse { surveys }))
}

async fn survey_analytics(
    State(state): State<ApiState>,
    Path(survey_id): Path<String>,
) -> ApiResult<AnalyticsReport> {
    let data = state.source.fetch_survey(&survey_id).await?;
    Ok(ok(build_report(&data)))
}

async fn survey_comparison(
    State(state): State<ApiState>,
    Path(survey_id): Path<String>,
    Query(query): Query<ToleranceQuery>,
) -> ApiResult<ComparisonView> {
    let tolerance = resolve_tolerance(&state, &query)?;
    let data = state.source.fetch_survey(&survey_id).await?;
    Ok(ok(build_comparison(&data, tolerance)))
}

async fn inline_analytics(Json(data): Json<SurveyData>) -> ApiResult<AnalyticsReport> {
    Ok(ok(build_report(&data)))
}

async fn inline_comparison(
    State(state): State<ApiState>,
    Query(query): Query<ToleranceQuery>,
    Json(data): Json<SurveyData>,
) -> ApiResult<ComparisonView> {
    let tolerance = resolve_tolerance(&state, &query)?;
    Ok(ok(build_comparison(&data, tolerance)))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        ok: true,
        generated_at: Utc::now(),
        data,
    })
}

fn resolve_tolerance(
    state: &ApiState,
    query: &ToleranceQuery,
) -> std::result::Result<f64, ApiError> {
    let tolerance = query.tolerance.unwrap_or_else(|| state.config.tolerance());
    validate_tolerance(tolerance).map_err(|error| ApiError::bad_request(error.to_string()))?;
    Ok(tolerance)
}
