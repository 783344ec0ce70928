//! API routes module

pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Catalog routes; nested under `/api` by `axum_helpers::create_router`.
pub fn routes(state: &AppState) -> Router {
    products::router(state)
}
