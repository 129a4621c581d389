use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::db;
use crate::models::{MonthKey, OverviewStats, TrendsStats};
use crate::stats::{self, FriendlySuggestions};

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    suggestions: Arc<FriendlySuggestions>,
    debug_default: bool,
}

impl AppState {
    pub fn new(pool: PgPool, suggestions: FriendlySuggestions, debug_default: bool) -> Self {
        Self {
            pool,
            suggestions: Arc::new(suggestions),
            debug_default,
        }
    }
}

/// The only failure surfaced by the analytics endpoints: the upstream fetch
/// failed. Carries the underlying message as a 500 response.
pub struct UpstreamError(anyhow::Error);

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        tracing::error!("upstream fetch failed: {:#}", self.0);
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl<E> From<E> for UpstreamError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Deserialize)]
struct MonthQuery {
    #[serde(default = "default_year")]
    year: i32,
    #[serde(default = "default_month")]
    month: u32,
    #[serde(default)]
    debug: bool,
}

fn default_year() -> i32 {
    2024
}

fn default_month() -> u32 {
    8
}

#[derive(Debug, Serialize)]
struct DebugInfo {
    sql_query: &'static str,
    row_count: usize,
    columns: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct OverviewResponse {
    #[serde(flatten)]
    stats: OverviewStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<DebugInfo>,
}

#[derive(Debug, Serialize)]
struct PreventativeResponse {
    preventative_maintenance_candidates: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn overview(
    State(state): State<AppState>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<OverviewResponse>, UpstreamError> {
    let records = db::fetch_month(&state.pool, params.year, params.month).await?;
    let stats = stats::overview(&records);

    let debug = if state.debug_default || params.debug {
        tracing::debug!(sql = db::MONTH_QUERY, rows = records.len(), "overview fetch");
        Some(DebugInfo {
            sql_query: db::MONTH_QUERY,
            row_count: records.len(),
            columns: db::REQUEST_COLUMNS.to_vec(),
        })
    } else {
        None
    };

    Ok(Json(OverviewResponse { stats, debug }))
}

async fn trends(
    State(state): State<AppState>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<TrendsStats>, UpstreamError> {
    let records = db::fetch_month(&state.pool, params.year, params.month).await?;
    Ok(Json(stats::monthly_trends(&records)))
}

async fn preventative(
    State(state): State<AppState>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<PreventativeResponse>, UpstreamError> {
    let records = db::fetch_month(&state.pool, params.year, params.month).await?;
    let candidates = stats::preventative_candidates(&records, &state.suggestions);
    Ok(Json(PreventativeResponse {
        preventative_maintenance_candidates: candidates,
    }))
}

async fn available_months(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthKey>>, UpstreamError> {
    let records = db::fetch_all(&state.pool).await?;
    Ok(Json(stats::available_months(&records)))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/stats/overview", get(overview))
        .route("/stats/trends", get(trends))
        .route("/stats/preventative", get(preventative))
        .route("/stats/available_months", get(available_months))
        .layer(cors)
        .with_state(state)
}
