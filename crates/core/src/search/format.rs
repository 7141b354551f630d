//! Text helpers shared by the search and packing answers.

use crate::domain::product::Product;

pub const ELLIPSIS: &str = "...";

/// Keeps the first `limit` characters, marking the cut with `...`.
pub fn truncate_title(title: &str, limit: usize) -> String {
    if title.chars().count() <= limit {
        return title.to_string();
    }
    let mut truncated = title.chars().take(limit).collect::<String>();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// One star per whole rating point, capped at five.
pub fn stars(rating: f64) -> String {
    let whole = rating.trunc().clamp(0.0, 5.0) as usize;
    "⭐".repeat(whole)
}

/// Ratings always show one decimal place at least: `4.0`, `4.5`, `4.25`.
pub fn rating_label(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.1}")
    } else {
        format!("{rating}")
    }
}

/// ` | ⭐⭐⭐⭐ 4.5/5` for rated products, empty otherwise.
pub fn rating_fragment(product: &Product) -> String {
    if !product.has_rating() {
        return String::new();
    }
    format!(" | {} {}/5", stars(product.rating), rating_label(product.rating))
}

/// Capitalizes the first letter of every word, lower-casing the rest. Any
/// non-alphabetic character starts a new word, so `e-reader` becomes `E-Reader`.
pub fn title_case(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                output.extend(ch.to_uppercase());
            } else {
                output.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            output.push(ch);
            at_word_start = true;
        }
    }

    output
}
