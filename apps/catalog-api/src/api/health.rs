//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use serde_json::Value;

use crate::state::AppState;

/// `/ready`, served next to `/health` outside `/api`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Readiness check: 200 when MongoDB answers a ping, 503 otherwise
async fn readiness_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "mongodb",
        Box::pin(async {
            database::mongodb::check_health(&state.db)
                .await
                .map(|latency_ms| tracing::debug!(latency_ms, "MongoDB ping"))
                .map_err(|e| e.to_string())
        }),
    )];

    run_health_checks(checks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::Request;
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use http_body_util::BodyExt;
    use mongodb::Client;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_ready_reports_unreachable_mongodb() {
        let client = Client::with_uri_str(
            "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200",
        )
        .await
        .unwrap();

        let state = AppState {
            config: Config {
                app: app_info!(),
                mongodb: MongoConfig::default(),
                server: ServerConfig::default(),
                environment: Environment::Development,
                products_collection: "product_items".to_string(),
            },
            db: client.database("catalog"),
            mongo_client: client,
        };

        let response = router(state)
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["mongodb"], "disconnected");
        assert_eq!(body["status"], "not ready");
    }
}
