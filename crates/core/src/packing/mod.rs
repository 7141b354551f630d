//! Trip description to packing list, with product picks per item.

pub mod rules;

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info};

use crate::domain::packing::{PackingItem, PackingList, PackingListAnswer};
use crate::domain::product::Product;
use crate::search::format::{rating_fragment, title_case, truncate_title};
use crate::search::provider::ProductSearch;
use crate::search::strategy::{first_success, Fallback};

use self::rules::{BASE_ITEMS, PACKING_TABLES};

pub const PACKING_ITEM_LIMIT: usize = 10;
pub const ITEM_SEARCH_MAX_RESULTS: usize = 4;
pub const ITEM_PRODUCT_LIMIT: usize = 3;
pub const ITEM_TITLE_LIMIT: usize = 50;

/// Base items followed by duration, climate and activity additions. Matching
/// is case-insensitive substring; duplicates keep their first position.
pub fn generate_smart_packing_list(description: &str) -> Vec<String> {
    let lowered = description.to_lowercase();
    let mut seen = HashSet::new();

    BASE_ITEMS
        .iter()
        .copied()
        .chain(PACKING_TABLES.iter().flat_map(|table| table.items_for(&lowered)))
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}

fn item_queries(item: &str) -> [String; 3] {
    [format!("travel {item}"), format!("best {item}"), item.to_string()]
}

#[derive(Clone)]
pub struct PackingListGenerator {
    search: ProductSearch,
}

impl PackingListGenerator {
    pub fn new(search: ProductSearch) -> Self {
        Self { search }
    }

    pub async fn generate_packing_list(&self, user_id: &str, description: &str) -> PackingListAnswer {
        info!(
            event_name = "packing.list.start",
            user_id = %user_id,
            description = %description,
            "generating packing list"
        );

        let mut list = PackingList::default();
        for item in generate_smart_packing_list(description).into_iter().take(PACKING_ITEM_LIMIT) {
            list.items.push(self.search_item(item).await);
        }

        let found = list.found().count();
        info!(
            event_name = "packing.list.completed",
            items = list.items.len(),
            found,
            "packing list generated"
        );

        let answer = if found == 0 {
            format!(
                "Unable to find specific product recommendations for your packing list: \
                 {description}. Try searching for individual items."
            )
        } else {
            render_packing_answer(description, &list)
        };

        PackingListAnswer { answer, asins: list.asins(), items: list }
    }

    async fn search_item(&self, item: String) -> PackingItem {
        let min_rating = self.search.min_rating();
        let search = &self.search;
        let outcome = first_success(item_queries(&item), move |query: String| async move {
            search.search(&query, ITEM_SEARCH_MAX_RESULTS, min_rating).await.into_products()
        })
        .await;

        match outcome {
            Fallback::Found { attempt, value: mut products } => {
                products.truncate(ITEM_PRODUCT_LIMIT);
                debug!(
                    event_name = "packing.item.found",
                    item = %item,
                    attempt,
                    count = products.len(),
                    "packing item matched products"
                );
                PackingItem::found(item, products)
            }
            Fallback::Exhausted { last_error, .. } => {
                debug!(
                    event_name = "packing.item.missing",
                    item = %item,
                    reason = last_error.as_deref().unwrap_or("No products found"),
                    "packing item needs a manual search"
                );
                PackingItem::missing(item)
            }
        }
    }
}

fn render_packing_answer(description: &str, list: &PackingList) -> String {
    PackingAnswer { description, list }.to_string().trim().to_string()
}

struct PackingAnswer<'a> {
    description: &'a str,
    list: &'a PackingList,
}

impl fmt::Display for PackingAnswer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { description, list } = self;
        write!(f, "🎒 **Smart Packing List for: {description}**\n\n")?;

        for item in &list.items {
            writeln!(f, "📦 **{}**", title_case(&item.item))?;
            if item.search_failed {
                f.write_str("   ❌ No specific products found - search manually\n\n")?;
                continue;
            }
            f.write_str("   🏆 **Top Recommendations:**\n")?;
            for (index, product) in item.products.iter().enumerate() {
                write_pick(f, index + 1, product)?;
            }
            f.write_str("\n")?;
        }

        writeln!(f, "✅ **Found products for {} items**", list.found().count())?;
        let missing = list.missing().map(|item| item.item.as_str()).collect::<Vec<_>>();
        if !missing.is_empty() {
            writeln!(f, "⚠️ **Manual search needed for:** {}", missing.join(", "))?;
        }
        f.write_str("\n💡 **Tip:** Ask me to add any items to your cart!")
    }
}

fn write_pick(f: &mut fmt::Formatter<'_>, position: usize, product: &Product) -> fmt::Result {
    writeln!(f, "   {position}. **{}**", truncate_title(&product.title, ITEM_TITLE_LIMIT))?;
    write!(f, "      💰 {}{}", product.price, rating_fragment(product))?;
    if product.prime {
        f.write_str(" | 🚚 Prime")?;
    }
    writeln!(f, "\n      🛒 ASIN: {}", product.asin)
}
