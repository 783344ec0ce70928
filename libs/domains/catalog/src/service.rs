//! Product Service - business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::projection::{ProductView, project_all};
use crate::query::{CategoryQuery, ProductFilter, ProductQuery, SearchQuery};
use crate::repository::ProductRepository;

/// Catalog operations: query parameters in, shaped responses out.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// List products, projected to `region` when one is given.
    ///
    /// An empty region-scoped result is `NoRegionalMatches`; an empty
    /// unscoped result is an empty list.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductQuery) -> ProductResult<Vec<ProductView>> {
        let filter = ProductFilter::from(query);
        let products = self.fetch(&filter).await?;

        if let Some(region) = filter.region_key() {
            if products.is_empty() {
                tracing::info!(region, "No products available for region");
                return Err(ProductError::NoRegionalMatches(region.to_string()));
            }
        }

        project_all(products, filter.region_key())
    }

    /// Products of one category available in one region; empty is not an error.
    #[instrument(skip(self))]
    pub async fn list_by_category(&self, query: CategoryQuery) -> ProductResult<Vec<ProductView>> {
        let filter = ProductFilter::try_from(query)?;
        let products = self.fetch(&filter).await?;

        project_all(products, filter.region_key())
    }

    /// Case-insensitive substring search over name and tags, unprojected.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: SearchQuery) -> ProductResult<Vec<Product>> {
        let filter = ProductFilter::try_from(query)?;
        self.fetch(&filter).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> ProductResult<Vec<String>> {
        self.repository.distinct_categories().await
    }

    /// Region keys in a product's price index (empty when it has none).
    #[instrument(skip(self))]
    pub async fn list_region_keys(&self, id: Uuid) -> ProductResult<Vec<String>> {
        Ok(self.get_product(id).await?.region_keys())
    }

    /// Run `filter` against the store and check the result against the
    /// in-process predicate.
    async fn fetch(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        let products = self.repository.find(filter).await?;

        if let Some(stray) = products.iter().find(|p| !filter.matches(p)) {
            tracing::error!(
                product_id = %stray.id,
                ?filter,
                "Store returned a product outside the filter"
            );
            return Err(ProductError::Internal(format!(
                "Store returned product {} which does not satisfy the query",
                stray.id
            )));
        }

        tracing::debug!(count = products.len(), "Products matched");
        Ok(products)
    }
}
