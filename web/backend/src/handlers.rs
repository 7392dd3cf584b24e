use crate::error::ApiError;
use crate::models::{HealthResponse, LookupQuery, VideoQuery};
use crate::state::AppState;
use crate::video::VideoMatch;
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use melograph_core::MediaCandidate;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

const CHART_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=59";

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Melograph API is running".to_string(),
    })
}

/// Resolved roster. Always 200; a short list means some artists degraded.
pub async fn artists_data(State(state): State<Arc<AppState>>) -> Json<Vec<MediaCandidate>> {
    Json(state.catalog.artists().await)
}

pub async fn find_video(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VideoQuery>,
) -> Result<Json<VideoMatch>, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query required"));
    }

    state
        .videos
        .find(query)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("No videos found"))
}

pub async fn itunes_lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = params.id.as_deref().map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err(ApiError::BadRequest("Missing id parameter"));
    }

    match state.itunes.lookup(id).await {
        Ok(body) => Ok(Json(body)),
        Err(err) => {
            warn!(id, error = %err, "itunes lookup failed");
            Err(err.into())
        }
    }
}

pub async fn top_chart(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    match state.charts.top_songs().await {
        Ok(body) => Ok(([(header::CACHE_CONTROL, CHART_CACHE_CONTROL)], Json(body))),
        Err(err) => {
            warn!(error = %err, "chart fetch failed");
            Err(err.into())
        }
    }
}

/// Always 200 on the RSS path; NewsAPI failures surface as 502.
pub async fn news(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match state.news.latest().await {
        Ok(body) => Ok(Json(body)),
        Err(err) => {
            warn!(error = %err, "news fetch failed");
            Err(err.into())
        }
    }
}
