use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
            timestamp: Utc::now(),
        })
    }

    /// 201 with the created resource.
    pub fn created(message: impl Into<String>, data: T) -> impl IntoResponse {
        (StatusCode::CREATED, Self::with_message(message, data))
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Self::with_message(message, ())
    }
}
