use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("No products available for region '{0}'")]
    NoRegionalMatches(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// A product reached projection without an entry for the queried region.
    #[error("Product {product_id} has no price entry for region '{region}'")]
    MissingRegionEntry { product_id: Uuid, region: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::NoRegionalMatches(region) => AppError::NotFound(format!(
                "No products available for the selected pincode '{}'",
                region
            )),
            ProductError::MissingParameter(name) => AppError::MissingParameter(name.to_string()),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            err @ ProductError::MissingRegionEntry { .. } => {
                AppError::InternalServerError(err.to_string())
            }
            ProductError::Database(msg) => AppError::Database(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProductError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (
                ProductError::NoRegionalMatches("500002".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ProductError::MissingParameter("query"),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProductError::Validation("name is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProductError::MissingRegionEntry {
                    product_id: Uuid::nil(),
                    region: "500001".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ProductError::Database("timeout".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
