use serde::Serialize;

use crate::domain::product::Product;
use crate::search::normalize::{extract_price_range, optimize_search_query};

/// Whole-dollar bounds pulled out of a query. Values are kept as written, so
/// `min > max` is possible and left to the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl PriceRange {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Floor to send upstream; a zero bound is not a filter.
    pub fn low_price(&self) -> Option<u64> {
        self.min.filter(|value| *value > 0)
    }

    pub fn high_price(&self) -> Option<u64> {
        self.max.filter(|value| *value > 0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw: String,
    pub optimized: String,
    pub price_range: PriceRange,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            optimized: optimize_search_query(raw),
            price_range: extract_price_range(raw),
        }
    }
}

/// Outcome of one provider round trip. Built fresh per call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub success: bool,
    pub products: Vec<Product>,
    pub total_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    pub fn found(products: Vec<Product>) -> Self {
        Self { success: true, total_results: products.len(), products, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, products: Vec::new(), total_results: 0, error: Some(error.into()) }
    }

    /// Successful and non-empty results as `Ok`; everything else as the reason.
    pub fn into_products(self) -> Result<Vec<Product>, String> {
        match (self.success, self.products.is_empty()) {
            (true, false) => Ok(self.products),
            _ => Err(self.error.unwrap_or_else(|| "No products found".to_string())),
        }
    }
}

/// Reply of the product-search tool.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductList {
    pub answer: String,
    pub asins: Vec<String>,
    pub products: Vec<Product>,
}
