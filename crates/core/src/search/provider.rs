use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::product::RawProduct;
use crate::domain::search::{SearchQuery, SearchResult};
use crate::errors::ProviderError;
use crate::search::ranking::{collect_qualifying, rank, DEFAULT_MIN_RATING};

/// One external product-search round trip. Implementations own transport,
/// credentials and timeouts; records come back in provider order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawProduct>, ProviderError>;
}

/// Provider call plus qualification and ranking. Never fails: provider errors
/// come back as an unsuccessful [`SearchResult`].
#[derive(Clone)]
pub struct ProductSearch {
    provider: Arc<dyn SearchProvider>,
    min_rating: f64,
}

impl ProductSearch {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider, min_rating: DEFAULT_MIN_RATING }
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    pub async fn search(&self, query: &str, max_results: usize, min_rating: f64) -> SearchResult {
        let query = SearchQuery::parse(query);

        match self.provider.fetch(&query).await {
            Ok(records) => {
                let received = records.len();
                let mut products = collect_qualifying(records, max_results, min_rating);
                rank(&mut products);
                debug!(
                    event_name = "search.provider.completed",
                    query = %query.optimized,
                    received,
                    retained = products.len(),
                    "provider search completed"
                );
                SearchResult::found(products)
            }
            Err(err) => {
                error!(
                    event_name = "search.provider.failed",
                    query = %query.optimized,
                    error_class = err.error_class(),
                    error = %err,
                    "provider search failed"
                );
                SearchResult::failed(err.to_string())
            }
        }
    }
}
