use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::product::Product;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackingItem {
    pub item: String,
    /// Top picks for the item, at most three.
    pub products: Vec<Product>,
    pub search_failed: bool,
}

impl PackingItem {
    pub fn found(item: impl Into<String>, products: Vec<Product>) -> Self {
        Self { item: item.into(), products, search_failed: false }
    }

    pub fn missing(item: impl Into<String>) -> Self {
        Self { item: item.into(), products: Vec::new(), search_failed: true }
    }

    pub fn asins(&self) -> Vec<String> {
        self.products
            .iter()
            .filter(|product| product.has_identifier())
            .map(|product| product.asin.clone())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PackingList {
    pub items: Vec<PackingItem>,
}

impl PackingList {
    pub fn found(&self) -> impl Iterator<Item = &PackingItem> {
        self.items.iter().filter(|item| !item.search_failed)
    }

    pub fn missing(&self) -> impl Iterator<Item = &PackingItem> {
        self.items.iter().filter(|item| item.search_failed)
    }

    /// Item name to ASINs, for items that found products, in list order.
    pub fn asins(&self) -> IndexMap<String, Vec<String>> {
        self.found().map(|item| (item.item.clone(), item.asins())).collect()
    }
}

/// Reply of the packing-list tool.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackingListAnswer {
    pub answer: String,
    pub asins: IndexMap<String, Vec<String>>,
    pub items: PackingList,
}
