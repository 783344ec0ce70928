//! Response shaping for region-scoped queries.
//!
//! With a region key, each product is flattened to its region-independent
//! fields plus that region's price record, and the full index is dropped.
//! Without one, the product is returned as stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;

/// A product as seen from one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionalProduct {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub price: f64,
    pub currency: String,
    pub stock: i64,
    pub available: bool,
}

/// List element of `/api/products` and `/api/products/category`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ProductView {
    Full(Product),
    Regional(RegionalProduct),
}

/// Shape one matched product.
///
/// The filter has already excluded products without an entry for `region`,
/// so a missing entry here is reported as [`ProductError::MissingRegionEntry`].
pub fn project(product: Product, region: Option<&str>) -> ProductResult<ProductView> {
    let Some(region) = region else {
        return Ok(ProductView::Full(product));
    };

    let Some(record) = product.price_by_pincode.get(region).cloned() else {
        tracing::error!(
            product_id = %product.id,
            region,
            "Matched product has no entry for the queried region"
        );
        return Err(ProductError::MissingRegionEntry {
            product_id: product.id,
            region: region.to_string(),
        });
    };

    Ok(ProductView::Regional(RegionalProduct {
        id: product.id,
        name: product.name,
        description: product.description,
        category: product.category,
        images: product.images,
        tags: product.tags,
        created_at: product.created_at,
        updated_at: product.updated_at,
        price: record.amount,
        currency: record.currency,
        stock: record.stock,
        available: record.available,
    }))
}

pub fn project_all(products: Vec<Product>, region: Option<&str>) -> ProductResult<Vec<ProductView>> {
    products
        .into_iter()
        .map(|product| project(product, region))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProduct, PriceRecord, RegionPriceIndex};

    fn mango() -> Product {
        Product::new(CreateProduct {
            name: "Mango".into(),
            description: "Alphonso".into(),
            category: "fruit".into(),
            images: vec!["/img/mango.png".into()],
            tags: vec!["summer".into()],
            price_by_pincode: RegionPriceIndex::from([
                ("500001".into(), PriceRecord::new(50.0, 10, true)),
                ("500002".into(), PriceRecord::new(55.0, 0, false)),
            ]),
        })
    }

    #[test]
    fn test_project_without_region_returns_product_unchanged() {
        let product = mango();
        let view = project(product.clone(), None).unwrap();
        assert_eq!(view, ProductView::Full(product));
    }

    #[test]
    fn test_project_flattens_region_record() {
        let product = mango();
        let id = product.id;

        let ProductView::Regional(regional) = project(product, Some("500001")).unwrap() else {
            panic!("expected regional view");
        };

        assert_eq!(regional.id, id);
        assert_eq!(regional.name, "Mango");
        assert_eq!(regional.images, vec!["/img/mango.png"]);
        assert_eq!(regional.price, 50.0);
        assert_eq!(regional.currency, "INR");
        assert_eq!(regional.stock, 10);
        assert!(regional.available);
    }

    #[test]
    fn test_regional_json_has_no_index() {
        let view = project(mango(), Some("500001")).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("price_by_pincode").is_none());
        assert_eq!(json["price"], 50.0);
        assert_eq!(json["stock"], 10);
        assert_eq!(json["available"], true);
        assert_eq!(json["currency"], "INR");
    }

    #[test]
    fn test_full_json_keeps_index() {
        let json = serde_json::to_value(project(mango(), None).unwrap()).unwrap();
        assert_eq!(json["price_by_pincode"]["500002"]["price"], 55.0);
        assert!(json.get("price").is_none());
    }

    #[test]
    fn test_project_missing_region_fails_loudly() {
        let product = mango();
        let id = product.id;

        let err = project(product, Some("999999")).unwrap_err();
        match err {
            ProductError::MissingRegionEntry { product_id, region } => {
                assert_eq!(product_id, id);
                assert_eq!(region, "999999");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_project_all_stops_at_first_inconsistency() {
        let mut bare = mango();
        bare.price_by_pincode.clear();

        assert!(project_all(vec![mango(), bare], Some("500001")).is_err());
        assert_eq!(project_all(vec![mango(), mango()], Some("500001")).unwrap().len(), 2);
        assert!(project_all(Vec::new(), Some("500001")).unwrap().is_empty());
    }
}
