use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::query::ProductFilter;

/// Data access for products
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product with a fresh id and timestamps
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// All products satisfying `filter`, oldest first
    async fn find(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>>;

    /// Merge `input` into the stored product; `NotFound` if the id is unknown
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product>;

    /// Returns `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Distinct non-empty category values, sorted
    async fn distinct_categories(&self) -> ProductResult<Vec<String>>;
}
