//! Catalog Domain
//!
//! Products with a per-region price index, stored in MongoDB, plus the
//! region-scoped queries and response shaping the storefront needs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, query-string parsing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────┐
//! │   Service   │ ──► │ Projection │  ← region-scoped response shaping
//! └──────┬──────┘     └────────────┘
//!        │ ProductFilter
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product, PriceRecord, region price index
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{handlers, MongoProductRepository, ProductService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(ProductService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod projection;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateProduct, DeleteResponse, PriceRecord, Product, RegionPriceIndex, UpdateProduct,
};
pub use mongodb::MongoProductRepository;
pub use projection::{ProductView, RegionalProduct};
pub use query::{CategoryQuery, ProductFilter, ProductQuery, RegionPredicate, SearchQuery};
pub use repository::ProductRepository;
pub use service::ProductService;
