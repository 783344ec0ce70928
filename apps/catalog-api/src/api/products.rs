//! Products API routes

use axum::Router;
use domain_catalog::{MongoProductRepository, ProductService, handlers};

use crate::state::AppState;

fn repository(state: &AppState) -> MongoProductRepository {
    MongoProductRepository::with_collection(&state.db, &state.config.products_collection)
}

/// Create products router
pub fn router(state: &AppState) -> Router {
    handlers::router(ProductService::new(repository(state)))
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    repository(state).init_indexes().await?;
    Ok(())
}
