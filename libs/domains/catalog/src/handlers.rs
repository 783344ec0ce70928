//! HTTP handlers for the catalog API

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, DatabaseErrorResponse,
        InternalServerErrorResponse, MissingParameterResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, DeleteResponse, PriceRecord, Product, UpdateProduct};
use crate::projection::{ProductView, RegionalProduct};
use crate::query::{CategoryQuery, ProductQuery, SearchQuery};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for the catalog routes
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        search_products,
        list_by_category,
        get_product,
        update_product,
        delete_product,
        list_pincodes,
        list_categories,
    ),
    components(
        schemas(
            Product, PriceRecord, CreateProduct, UpdateProduct,
            ProductView, RegionalProduct, DeleteResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            MissingParameterResponse,
            DatabaseErrorResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog with per-region pricing"),
        (name = "Categories", description = "Category listing")
    )
)]
pub struct ApiDoc;

/// Catalog router; nest it under `/api`.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/category", get(list_by_category))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/pincodes", get(list_pincodes))
        .route("/categories", get(list_categories))
        .with_state(shared_service)
}

/// Query strings that fail to parse (e.g. `inStockOnly=maybe`) get the JSON
/// error body instead of axum's plain-text rejection.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ProductResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ProductError::Validation(e.body_text()))
}

/// List products, optionally scoped to a region
///
/// With `region`, each item carries that region's price, currency, stock and
/// availability instead of the full index, and an empty result is a 404.
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Matching products", body = Vec<ProductView>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ProductResult<Json<Vec<ProductView>>> {
    let products = service.list_products(query_params(query)?).await?;
    Ok(Json(products))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Search products by name or tag
#[utoipa::path(
    get,
    path = "/products/search",
    tag = "Products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = Vec<Product>),
        (status = 400, response = MissingParameterResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.search_products(query_params(query)?).await?;
    Ok(Json(products))
}

/// Products of a category available in a region
#[utoipa::path(
    get,
    path = "/products/category",
    tag = "Products",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Matching products, projected to the region", body = Vec<ProductView>),
        (status = 400, response = MissingParameterResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn list_by_category<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> ProductResult<Json<Vec<ProductView>>> {
    let products = service.list_by_category(query_params(query)?).await?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = DeleteResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<DeleteResponse>> {
    service.delete_product(id).await?;
    Ok(Json(DeleteResponse::new(id)))
}

/// Region keys (pincodes) a product is priced in
#[utoipa::path(
    get,
    path = "/products/{id}/pincodes",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Region keys", body = Vec<String>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn list_pincodes<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Vec<String>>> {
    let keys = service.list_region_keys(id).await?;
    Ok(Json(keys))
}

/// Distinct product categories
///
/// Sorted; products without a category (empty string) do not contribute one.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Category names", body = Vec<String>),
        (status = 500, response = DatabaseErrorResponse)
    )
)]
async fn list_categories<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<String>>> {
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}
