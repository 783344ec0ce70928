pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1012,
///   "error": "MISSING_PARAMETER",
///   "message": "Missing required query parameter: query",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details (validation field errors, store diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Boundary error type; every handler error ends up here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(e) => e.status(),
            AppError::ValidationError(_)
            | AppError::UuidError(_)
            | AppError::MissingParameter(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SerdeJson(_)
            | AppError::Io(_)
            | AppError::Database(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::SerdeJson(_) => ErrorCode::SerdeJsonError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::UuidError(_) => ErrorCode::InvalidUuid,
            AppError::MissingParameter(_) => ErrorCode::MissingParameter,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let body = match self {
            AppError::SerdeJson(e) => {
                tracing::error!(error_code = code.code(), "JSON parsing error: {:?}", e);
                ErrorResponse::new(code, code.default_message())
            }
            AppError::Io(e) => {
                tracing::error!(error_code = code.code(), "I/O error: {:?}", e);
                ErrorResponse::new(code, code.default_message())
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {:?}", e);
                ErrorResponse::new(code, e.body_text())
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = code.code(), "Validation error: {:?}", e);
                ErrorResponse::new(code, code.default_message())
                    .with_details(serde_json::to_value(&e).unwrap_or(serde_json::Value::Null))
            }
            AppError::UuidError(e) => {
                tracing::warn!(error_code = code.code(), "UUID error: {:?}", e);
                ErrorResponse::new(code, code.default_message())
            }
            AppError::MissingParameter(name) => {
                tracing::info!(error_code = code.code(), parameter = %name, "Missing parameter");
                ErrorResponse::new(code, format!("Missing required query parameter: {}", name))
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = code.code(), "Bad request: {}", msg);
                ErrorResponse::new(code, msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = code.code(), "Not found: {}", msg);
                ErrorResponse::new(code, msg)
            }
            AppError::Database(msg) => {
                tracing::error!(error_code = code.code(), "Database error: {}", msg);
                ErrorResponse::new(code, code.default_message())
                    .with_details(serde_json::json!({ "store_message": msg }))
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
                ErrorResponse::new(code, msg)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(error_code = code.code(), "Service unavailable: {}", msg);
                ErrorResponse::new(code, msg)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Build a bare error response outside of an `AppError`.
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::BAD_REQUEST,
///     "Invalid input".to_string(),
///     ErrorCode::ValidationError,
/// );
/// ```
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_parameter_is_bad_request() {
        let response = AppError::MissingParameter("query".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "MISSING_PARAMETER");
        assert_eq!(json["code"], 1012);
        assert_eq!(json["message"], "Missing required query parameter: query");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_database_error_attaches_store_message() {
        let response = AppError::Database("connection reset".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "DATABASE_ERROR");
        assert_eq!(json["details"]["store_message"], "connection reset");
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let response = AppError::NotFound("Product abc not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Product abc not found");
        assert_eq!(json["code"], ErrorCode::NotFound.code());
    }

    #[test]
    fn test_uuid_error_maps_to_invalid_uuid() {
        let err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let app_err = AppError::from(err);
        assert_eq!(app_err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app_err.error_code(), ErrorCode::InvalidUuid);
    }
}
