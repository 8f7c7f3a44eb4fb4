use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid catalog query: {0}")]
    InvalidQuery(String),

    #[error("Upstream request failed (status {status:?}): {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Roadmap generation failed after {attempts} attempts")]
    RoadmapGenerationFailed { attempts: u32, last_raw: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidQuery(msg) => AppError::InvalidQuery(msg),
            CatalogError::Status { status, body } => AppError::Upstream {
                status: Some(status),
                message: body,
            },
            other => AppError::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut raw = None;
        let mut upstream = None;

        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, "INVALID_QUERY", msg.clone()),
            AppError::Upstream { status, message } => {
                tracing::error!("Upstream error ({status:?}): {message}");
                upstream = Some(json!({ "status": status, "body": message }));
                let summary = match status {
                    Some(code) => format!("The job information service responded with status {code}"),
                    None => "The job information service could not be reached".to_string(),
                };
                (StatusCode::BAD_GATEWAY, "UPSTREAM_REQUEST_FAILED", summary)
            }
            AppError::RoadmapGenerationFailed { attempts, last_raw } => {
                tracing::error!("Roadmap generation gave up after {attempts} attempts");
                raw = Some(last_raw.clone());
                (
                    StatusCode::BAD_GATEWAY,
                    "ROADMAP_GENERATION_FAILED",
                    format!("Could not generate a valid roadmap after {attempts} attempts"),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
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

        let mut body = json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        });
        if let Some(raw) = raw {
            body["raw"] = json!(raw);
        }
        if let Some(upstream) = upstream {
            body["upstream"] = upstream;
        }

        (status, Json(body)).into_response()
    }
}
