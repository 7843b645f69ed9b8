use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Missing reference data is not an error here: matching and gap evaluation
/// degrade to zero vectors and placeholder text instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The external task classifier failed or timed out.
    #[error("Task classification failed: {0}")]
    Classifier(String),

    /// The external feedback generator failed or timed out.
    #[error("Feedback generation failed: {0}")]
    FeedbackGeneration(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Classifier(msg) => {
                tracing::error!("Classifier error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "CLASSIFIER_ERROR",
                    "Task classification is currently unavailable".to_string(),
                )
            }
            AppError::FeedbackGeneration(msg) => {
                tracing::error!("Feedback generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FEEDBACK_GENERATION_ERROR",
                    "Feedback generation is currently unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("rolloutScope must be 0-4".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_external_failures_are_distinguishable() {
        let classifier = AppError::Classifier("timeout".to_string()).into_response();
        let generator = AppError::FeedbackGeneration("timeout".to_string()).into_response();
        assert_eq!(classifier.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(generator.status(), StatusCode::BAD_GATEWAY);
        assert!(AppError::Classifier("x".into())
            .to_string()
            .starts_with("Task classification"));
        assert!(AppError::FeedbackGeneration("x".into())
            .to_string()
            .starts_with("Feedback generation"));
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("Assessment 42 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
