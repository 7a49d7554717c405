use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

/// Field name to message, one entry per invalid field.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "Resource not found",
            AppError::InvalidArgument(_) => "Bad request",
            AppError::Validation(_) => "Invalid input data",
            AppError::Conflict(_) => "Conflict",
            AppError::Internal(_) | AppError::Database(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "An unexpected error occurred".to_string()
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                "An unexpected error occurred".to_string()
            }
            AppError::Validation(errors) => {
                tracing::warn!(?errors, "Validation failed");
                self.to_string()
            }
            other => {
                tracing::warn!(status = %status, error = %other, "Request rejected");
                other.to_string()
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
            "error": self.label(),
            "timestamp": Utc::now(),
        });
        if let AppError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidArgument(rejection.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

/// Collects every invalid field before failing, so callers see all problems
/// of a request at once.
#[derive(Debug, Default)]
pub struct Violations {
    errors: FieldErrors,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless `ok` holds. The first message
    /// recorded for a field wins.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors
                .entry(field.to_string())
                .or_insert_with(|| message.to_string());
        }
        self
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidArgument("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Validation(FieldErrors::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_violations_aggregate_all_fields() {
        let mut violations = Violations::new();
        violations
            .check(false, "size", "Size must be between 1 and 100")
            .check(true, "page", "Page must not be negative")
            .check(false, "sortBy", "Unknown sort field")
            .check(false, "size", "second message is ignored");

        match violations.finish() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors["size"], "Size must be between 1 and 100");
                assert!(errors.contains_key("sortBy"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_violations_pass() {
        assert!(Violations::new().finish().is_ok());
    }
}
