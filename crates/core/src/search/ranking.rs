use std::cmp::Ordering;

use crate::domain::product::{Product, RawProduct};

pub const DEFAULT_MIN_RATING: f64 = 3.5;

/// A usable identifier, and either no rating or one at or above `min_rating`.
pub fn is_qualifying(product: &Product, min_rating: f64) -> bool {
    let below_threshold = product.has_rating() && product.rating < min_rating;
    product.has_identifier() && !below_threshold
}

/// Decodes provider records in order and keeps the first `max_results` that qualify.
pub fn collect_qualifying<I>(records: I, max_results: usize, min_rating: f64) -> Vec<Product>
where
    I: IntoIterator<Item = RawProduct>,
{
    records
        .into_iter()
        .map(Product::from)
        .filter(|product| is_qualifying(product, min_rating))
        .take(max_results)
        .collect()
}

/// Best rated first, review count breaking ties. Stable, so equal products
/// keep provider order.
pub fn rank(products: &mut [Product]) {
    products.sort_by(|left, right| compare_quality(right, left));
}

fn compare_quality(left: &Product, right: &Product) -> Ordering {
    left.rating.total_cmp(&right.rating).then_with(|| left.reviews.cmp(&right.reviews))
}
