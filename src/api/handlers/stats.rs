use crate::application::stats;
use axum::{Json, extract::State};
use std::sync::Arc;

use super::AppState;
use crate::api::{
    error::ApiError,
    types::{HealthResponse, StatsResponse},
};

/// GET /stats - ダッシュボード用の集計
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let snapshot = stats::get_stats(&state.service_deps).await?;
    Ok(Json(StatsResponse::from(snapshot)))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
