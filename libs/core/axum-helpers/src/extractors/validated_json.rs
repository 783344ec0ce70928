//! JSON extractor that runs `validator` checks before the handler sees the body.

use crate::errors::{AppError, ErrorCode, ErrorResponse};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON body extractor with validation.
///
/// Malformed JSON is rejected with `JSON_EXTRACTION`; a body that parses but
/// fails `Validate` is rejected with `400 VALIDATION_ERROR` and per-field details.
///
/// ```ignore
/// use axum::{Router, routing::post};
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateProduct {
///     #[validate(length(min = 1))]
///     name: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateProduct>) -> String {
///     payload.name
/// }
///
/// let app = Router::new().route("/products", post(create));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::JsonExtractorRejection(e).into_response())?;

        data.validate().map_err(|e| validation_response(&e))?;

        Ok(ValidatedJson(data))
    }
}

fn validation_response(errors: &ValidationErrors) -> Response {
    tracing::info!(
        error_code = ErrorCode::ValidationError.code(),
        "Validation error: {:?}",
        errors
    );

    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let entries: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::json!(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    let body = ErrorResponse::new(
        ErrorCode::ValidationError,
        ErrorCode::ValidationError.default_message(),
    )
    .with_details(serde_json::Value::Object(details));

    (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
    }

    async fn create(ValidatedJson(payload): ValidatedJson<Payload>) -> String {
        payload.name
    }

    async fn send(body: &str) -> Response {
        Router::new()
            .route("/", post(create))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let response = send(r#"{"name":"Mango"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_body_reports_field_details() {
        let response = send(r#"{"name":""}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["details"]["name"][0]["code"], "length");
    }

    #[tokio::test]
    async fn test_malformed_json_is_extraction_error() {
        let response = send("{not json").await;
        assert!(response.status().is_client_error());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "JSON_EXTRACTION");
    }
}
