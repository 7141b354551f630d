pub mod format;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod ranking;
pub mod strategy;

pub use normalize::{extract_price_range, optimize_search_query};
pub use orchestrator::SearchOrchestrator;
pub use provider::{ProductSearch, SearchProvider};
pub use ranking::DEFAULT_MIN_RATING;
pub use strategy::{first_success, query_variants, Fallback, QueryStrategy, QueryVariant};
