use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since startup
    pub uptime: f64,
    pub environment: String,
    pub apis: ApiStatus,
}

/// Whether credentials for each upstream are configured
#[derive(Debug, Serialize)]
pub struct ApiStatus {
    pub tmdb: bool,
    pub openai: bool,
}

/// Health check endpoint, never rate limited
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.environment.clone(),
        apis: ApiStatus {
            tmdb: state.tmdb_configured,
            openai: state.openai_configured,
        },
    })
}
