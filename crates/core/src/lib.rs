//! Domain core for the concierge shopping subagents.
//!
//! Everything here is transport-free: the search provider is reached through
//! the [`search::SearchProvider`] trait and configuration is passed in
//! explicitly, so the ranking and answer-building logic can be exercised
//! without a network.

pub mod config;
pub mod domain;
pub mod errors;
pub mod packing;
pub mod search;

pub use domain::packing::{PackingItem, PackingList, PackingListAnswer};
pub use domain::product::{Price, Product, RawProduct};
pub use domain::search::{PriceRange, ProductList, SearchQuery, SearchResult};
pub use errors::ProviderError;
pub use packing::{generate_smart_packing_list, PackingListGenerator};
pub use search::{ProductSearch, SearchOrchestrator, SearchProvider};
