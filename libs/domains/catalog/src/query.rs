//! Request parameters and the store-independent product filter built from them.
//!
//! Each endpoint has its own query shape; all of them reduce to a
//! [`ProductFilter`]. The MongoDB translation lives in
//! [`crate::mongodb::MongoProductRepository::build_filter`], and
//! [`ProductFilter::matches`] is the in-process statement of the same
//! predicate.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, RegionPriceIndex};

/// `GET /api/products`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ProductQuery {
    /// Region key (pincode); results are projected to this region
    #[serde(alias = "pincode")]
    pub region: Option<String>,
    /// Exact category match
    pub category: Option<String>,
    /// Require stock > 0 in the region; ignored without `region`
    #[serde(alias = "in_stock_only")]
    pub in_stock_only: Option<bool>,
}

/// `GET /api/products/category`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CategoryQuery {
    /// Category name (required)
    pub name: Option<String>,
    /// Region key (required)
    #[serde(alias = "pincode")]
    pub region: Option<String>,
    #[serde(alias = "in_stock_only")]
    pub in_stock_only: Option<bool>,
}

/// `GET /api/products/search`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against name and tags (required)
    #[serde(alias = "q")]
    pub query: Option<String>,
}

/// Region constraint of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPredicate {
    pub key: String,
    pub in_stock_only: bool,
}

impl RegionPredicate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            in_stock_only: false,
        }
    }

    pub fn in_stock_only(mut self, in_stock_only: bool) -> Self {
        self.in_stock_only = in_stock_only;
        self
    }

    /// A missing key counts as not available.
    pub fn matches(&self, index: &RegionPriceIndex) -> bool {
        index
            .get(&self.key)
            .is_some_and(|record| record.available && (!self.in_stock_only || record.in_stock()))
    }
}

/// Conjunction of optional constraints; the empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub region: Option<RegionPredicate>,
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_region(mut self, region: RegionPredicate) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn region_key(&self) -> Option<&str> {
        self.region.as_ref().map(|r| r.key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.region.is_none() && self.search.is_none()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(ref category) = self.category {
            if &product.category != category {
                return false;
            }
        }

        if let Some(ref region) = self.region {
            if !region.matches(&product.price_by_pincode) {
                return false;
            }
        }

        if let Some(ref text) = self.search {
            let Some(pattern) = search_pattern(text) else {
                return false;
            };
            let hit = pattern.is_match(&product.name)
                || product.tags.iter().any(|tag| pattern.is_match(tag));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Literal, caseless substring pattern; the same escaping the store query uses.
fn search_pattern(text: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(text))
        .case_insensitive(true)
        .build()
        .inspect_err(|e| tracing::warn!(error = %e, "Search text does not compile to a pattern"))
        .ok()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &'static str) -> ProductResult<String> {
    present(value).ok_or(ProductError::MissingParameter(name))
}

impl From<ProductQuery> for ProductFilter {
    fn from(query: ProductQuery) -> Self {
        let in_stock_only = query.in_stock_only.unwrap_or(false);

        ProductFilter {
            category: present(query.category),
            region: present(query.region)
                .map(|key| RegionPredicate::new(key).in_stock_only(in_stock_only)),
            search: None,
        }
    }
}

impl TryFrom<CategoryQuery> for ProductFilter {
    type Error = ProductError;

    fn try_from(query: CategoryQuery) -> ProductResult<Self> {
        let name = required(query.name, "name")?;
        let region = required(query.region, "region")?;

        Ok(ProductFilter::all().with_category(name).with_region(
            RegionPredicate::new(region).in_stock_only(query.in_stock_only.unwrap_or(false)),
        ))
    }
}

impl TryFrom<SearchQuery> for ProductFilter {
    type Error = ProductError;

    fn try_from(query: SearchQuery) -> ProductResult<Self> {
        let text = required(query.query, "query")?;
        Ok(ProductFilter::all().with_search(text))
    }
}
