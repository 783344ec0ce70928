use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_CURRENCY: &str = "INR";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Price, stock and availability of one product in one region.
///
/// `stock` and `available` are independent: a record may be available with
/// zero stock, or unavailable with stock on hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceRecord {
    #[serde(rename = "price", alias = "amount")]
    #[schema(example = 50.0)]
    pub amount: f64,
    #[serde(default = "default_currency")]
    #[schema(example = "INR")]
    pub currency: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub available: bool,
}

impl PriceRecord {
    pub fn new(amount: f64, stock: i64, available: bool) -> Self {
        Self {
            amount,
            currency: default_currency(),
            stock,
            available,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Region key (postal code / pincode) to price record.
///
/// Keys are arbitrary caller-supplied strings.
pub type RegionPriceIndex = BTreeMap<String, PriceRecord>;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Image URLs or paths, in display order
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "price_by_region")]
    pub price_by_pincode: RegionPriceIndex,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /api/products`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "price_by_region")]
    pub price_by_pincode: RegionPriceIndex,
}

/// Payload for `PUT /api/products/{id}`; absent fields are left unchanged.
///
/// A supplied `price_by_pincode` replaces the whole index.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(alias = "price_by_region")]
    pub price_by_pincode: Option<RegionPriceIndex>,
}

/// Body of a successful delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
    pub id: Uuid,
}

impl DeleteResponse {
    pub fn new(id: Uuid) -> Self {
        Self {
            message: "Product deleted successfully".to_string(),
            id,
        }
    }
}

/// Strictly later than `previous` at the store's millisecond precision.
pub fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + TimeDelta::milliseconds(1))
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            category: input.category,
            images: input.images,
            tags: input.tags,
            price_by_pincode: input.price_by_pincode,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(index) = update.price_by_pincode {
            self.price_by_pincode = index;
        }
        self.updated_at = next_update_time(self.updated_at);
    }

    pub fn price_for(&self, region: &str) -> Option<&PriceRecord> {
        self.price_by_pincode.get(region)
    }

    /// Region keys present in the price index, in sorted order.
    pub fn region_keys(&self) -> Vec<String> {
        self.price_by_pincode.keys().cloned().collect()
    }
}
