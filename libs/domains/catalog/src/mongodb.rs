//! MongoDB implementation of ProductRepository
//!
//! Documents keep the region index as an array of entries rather than an
//! object keyed by region, so region keys never become field paths:
//!
//! ```json
//! {
//!   "_id": "0190c7e8-...",
//!   "name": "Mango",
//!   "pricing": [
//!     { "region": "500001", "price": 50.0, "currency": "INR", "stock": 10, "available": true }
//!   ],
//!   "created_at": ISODate("...")
//! }
//! ```
//!
//! Documents in any other layout (an ObjectId `_id`, a `price_by_pincode`
//! object) are not read back: listings skip them with a warning.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Bson, Document, doc},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, PriceRecord, Product, RegionPriceIndex, UpdateProduct};
use crate::query::ProductFilter;
use crate::repository::ProductRepository;

/// Collection used when none is configured
pub const DEFAULT_COLLECTION: &str = "product_items";

/// One element of a stored product's `pricing` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    region: String,
    price: f64,
    currency: String,
    stock: i64,
    available: bool,
}

/// Stored shape of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    pricing: Vec<PricingEntry>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

fn to_bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

fn from_bson_datetime(value: bson::DateTime) -> ProductResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value.timestamp_millis())
        .single()
        .ok_or_else(|| ProductError::Internal(format!("Stored timestamp out of range: {}", value)))
}

fn pricing_entries(index: &RegionPriceIndex) -> Vec<PricingEntry> {
    index
        .iter()
        .map(|(region, record)| PricingEntry {
            region: region.clone(),
            price: record.amount,
            currency: record.currency.clone(),
            stock: record.stock,
            available: record.available,
        })
        .collect()
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            images: product.images.clone(),
            tags: product.tags.clone(),
            pricing: pricing_entries(&product.price_by_pincode),
            created_at: to_bson_datetime(product.created_at),
            updated_at: to_bson_datetime(product.updated_at),
        }
    }
}

impl TryFrom<ProductDocument> for Product {
    type Error = ProductError;

    fn try_from(document: ProductDocument) -> ProductResult<Self> {
        let id = Uuid::parse_str(&document.id).map_err(|e| {
            ProductError::Internal(format!("Stored product id '{}' is not a UUID: {}", document.id, e))
        })?;

        // Later entries win if a region was stored twice.
        let price_by_pincode: RegionPriceIndex = document
            .pricing
            .into_iter()
            .map(|entry| {
                (
                    entry.region,
                    PriceRecord {
                        amount: entry.price,
                        currency: entry.currency,
                        stock: entry.stock,
                        available: entry.available,
                    },
                )
            })
            .collect();

        Ok(Product {
            id,
            name: document.name,
            description: document.description,
            category: document.category,
            images: document.images,
            tags: document.tags,
            price_by_pincode,
            created_at: from_bson_datetime(document.created_at)?,
            updated_at: from_bson_datetime(document.updated_at)?,
        })
    }
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

/// Decode a stored document, or log and drop it when it is not in our layout.
fn decode_product(raw: Document) -> Option<Product> {
    let id = raw.get("_id").cloned();

    let decoded = bson::from_document::<ProductDocument>(raw)
        .map_err(|e| ProductError::Internal(e.to_string()))
        .and_then(Product::try_from);

    match decoded {
        Ok(product) => Some(product),
        Err(e) => {
            tracing::warn!(?id, error = %e, "Skipping product document that does not decode");
            None
        }
    }
}

/// `$literal` keeps user text such as `"$name"` from being read as a field path.
fn literal(value: impl Into<Bson>) -> Document {
    doc! { "$literal": value.into() }
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<ProductDocument>(collection_name);
        Self { collection }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// Create the indexes backing the list, category and region queries.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "pricing.region": 1, "pricing.available": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_pricing_region_available".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(
            collection = self.collection.name(),
            "Product indexes created successfully"
        );
        Ok(())
    }

    /// Translate a ProductFilter into a MongoDB query document.
    pub fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref category) = filter.category {
            doc.insert("category", category.as_str());
        }

        if let Some(ref region) = filter.region {
            let mut entry = doc! {
                "region": region.key.as_str(),
                "available": true,
            };
            if region.in_stock_only {
                entry.insert("stock", doc! { "$gt": 0 });
            }
            doc.insert("pricing", doc! { "$elemMatch": entry });
        }

        if let Some(ref search) = filter.search {
            let pattern = regex::escape(search);
            doc.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                    doc! { "tags": { "$regex": pattern.as_str(), "$options": "i" } },
                ],
            );
        }

        doc
    }

    /// Pipeline update that sets only the supplied fields.
    ///
    /// `updated_at` becomes the server clock, or one millisecond past the
    /// stored value when the clock has not moved past it.
    pub fn build_update(input: UpdateProduct) -> ProductResult<Vec<Document>> {
        let mut set = doc! {};

        if let Some(name) = input.name {
            set.insert("name", literal(name));
        }
        if let Some(description) = input.description {
            set.insert("description", literal(description));
        }
        if let Some(category) = input.category {
            set.insert("category", literal(category));
        }
        if let Some(images) = input.images {
            set.insert("images", literal(images));
        }
        if let Some(tags) = input.tags {
            set.insert("tags", literal(tags));
        }
        if let Some(index) = input.price_by_pincode {
            let pricing = bson::to_bson(&pricing_entries(&index))
                .map_err(|e| ProductError::Internal(format!("Cannot encode pricing: {}", e)))?;
            set.insert("pricing", literal(pricing));
        }

        set.insert(
            "updated_at",
            doc! { "$max": ["$$NOW", { "$add": ["$updated_at", 1] }] },
        );

        Ok(vec![doc! { "$set": set }])
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let document = ProductDocument::from(&Product::new(input));

        self.collection.insert_one(&document).await?;

        // Echo what was stored (timestamps at store precision).
        let product = Product::try_from(document)?;
        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        self.collection
            .find_one(id_filter(id))
            .await?
            .map(Product::try_from)
            .transpose()
    }

    #[instrument(skip(self), fields(region = filter.region_key()))]
    async fn find(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        use futures_util::TryStreamExt;

        let mongo_filter = Self::build_filter(filter);
        tracing::debug!(filter = %mongo_filter, "Querying products");

        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1, "_id": 1 })
            .build();

        let cursor = self
            .collection
            .clone_with_type::<Document>()
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        Ok(documents.into_iter().filter_map(decode_product).collect())
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let document = self
            .collection
            .find_one_and_update(id_filter(id), Self::build_update(input)?)
            .with_options(options)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        tracing::info!(product_id = %id, "Product updated successfully");
        Product::try_from(document)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;

        if result.deleted_count == 0 {
            return Ok(false);
        }

        tracing::info!(product_id = %id, "Product deleted successfully");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn distinct_categories(&self) -> ProductResult<Vec<String>> {
        let values = self.collection.distinct("category", doc! {}).await?;

        let mut categories: Vec<String> = values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect();
        categories.sort();
        categories.dedup();

        Ok(categories)
    }
}
