use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub application: String,
    pub timestamp: DateTime<Utc>,
}

/// Liveness check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        application: state.config.app_name.clone(),
        timestamp: Utc::now(),
    })
}
