use std::fmt;

use tracing::{info, warn};

use crate::domain::product::Product;
use crate::domain::search::ProductList;
use crate::search::format::{rating_fragment, truncate_title};
use crate::search::provider::ProductSearch;
use crate::search::strategy::{first_success, query_variants, Fallback, QueryVariant};

pub const SEARCH_MAX_RESULTS: usize = 12;
pub const ANSWER_PRODUCT_LIMIT: usize = 8;
pub const ANSWER_TITLE_LIMIT: usize = 80;

const SEARCH_FOOTER: &str = "🎯 **Ready to Shop?**\n\
• Tell me which items you'd like to add to your cart (e.g., 'Add item 1 and 3')\n\
• Say 'add all to cart' to add all products\n\
• Or ask me to find more specific products!\n\n\
💡 **Pro Tip**: I can help you add items to your cart and complete your purchase seamlessly!";

/// Drives the query variants through [`ProductSearch`] and renders the answer.
#[derive(Clone)]
pub struct SearchOrchestrator {
    search: ProductSearch,
}

impl SearchOrchestrator {
    pub fn new(search: ProductSearch) -> Self {
        Self { search }
    }

    pub async fn search_products(&self, user_id: &str, question: &str) -> ProductList {
        info!(
            event_name = "search.products.start",
            user_id = %user_id,
            question = %question,
            "processing product search"
        );

        let min_rating = self.search.min_rating();
        let search = &self.search;
        let outcome = first_success(query_variants(question), move |variant: QueryVariant| {
            async move {
                info!(
                    event_name = "search.products.attempt",
                    strategy = variant.strategy.label(),
                    query = %variant.query,
                    "trying query variant"
                );
                let result = search.search(&variant.query, SEARCH_MAX_RESULTS, min_rating).await;
                result.into_products().map_err(|reason| {
                    warn!(
                        event_name = "search.products.attempt_failed",
                        strategy = variant.strategy.label(),
                        reason = %reason,
                        "query variant returned nothing usable"
                    );
                    reason
                })
            }
        })
        .await;

        match outcome {
            Fallback::Found { attempt, value: products } => {
                info!(
                    event_name = "search.products.found",
                    attempt,
                    count = products.len(),
                    "product search succeeded"
                );
                let asins = products
                    .iter()
                    .filter(|product| product.has_identifier())
                    .map(|product| product.asin.clone())
                    .collect();
                ProductList { answer: render_product_answer(question, &products), asins, products }
            }
            Fallback::Exhausted { last_error, .. } => ProductList {
                answer: format!(
                    "No products found matching '{question}'. Try being more specific or using \
                     different keywords. Error: {}",
                    last_error.as_deref().unwrap_or("No products found")
                ),
                asins: Vec::new(),
                products: Vec::new(),
            },
        }
    }
}

fn render_product_answer(question: &str, products: &[Product]) -> String {
    ProductAnswer { question, products }.to_string().trim().to_string()
}

struct ProductAnswer<'a> {
    question: &'a str,
    products: &'a [Product],
}

impl fmt::Display for ProductAnswer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { question, products } = self;
        write!(f, "🛍️ **Found {} high-quality products for '{question}'**\n\n", products.len())?;

        for (index, product) in products.iter().take(ANSWER_PRODUCT_LIMIT).enumerate() {
            let price = product.price.to_string();
            writeln!(
                f,
                "**{}. {}**",
                index + 1,
                truncate_title(&product.title, ANSWER_TITLE_LIMIT)
            )?;
            write!(f, "   💰 **Price**: {price}{}", rating_fragment(product))?;
            if product.has_rating() && product.reviews > 0 {
                write!(f, " ({} reviews)", product.reviews)?;
            }
            if product.prime {
                f.write_str(" | 🚚 **Prime Eligible**")?;
            }
            write!(f, "\n   🔗 **ASIN**: `{}`", product.asin)?;
            write!(f, "\n   🛒 **Link**: {}", product.product_url())?;
            write!(f, "\n   📦 **Cart Data**: ASIN: {}, Price: {price}\n\n", product.asin)?;
        }

        f.write_str(SEARCH_FOOTER)
    }
}
