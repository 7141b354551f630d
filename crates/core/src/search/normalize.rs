//! Query rewriting ahead of the provider call.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::domain::search::PriceRange;

/// Conversational lead-ins that only add noise to a keyword search, removed in order.
pub const FILLER_PHRASES: &[&str] =
    &["i need", "i want", "looking for", "find me", "search for", "show me", "get me"];

/// Keyword to expansion, in priority order. At most one expansion is applied.
pub const QUERY_EXPANSIONS: &[(&str, &str)] = &[
    ("hiking", "hiking outdoor gear"),
    ("travel", "travel accessories"),
    ("beach", "beach vacation"),
    ("winter", "winter gear"),
    ("workout", "fitness exercise"),
    ("office", "office supplies"),
    ("kitchen", "kitchen appliances"),
    ("phone", "smartphone accessories"),
    ("laptop", "laptop computer"),
    ("camera", "digital camera photography"),
];

pub fn optimize_search_query(query: &str) -> String {
    let mut rewritten = query.to_lowercase();

    for filler in FILLER_PHRASES {
        rewritten = rewritten.replace(filler, "").trim().to_string();
    }

    if let Some((_, expansion)) = QUERY_EXPANSIONS
        .iter()
        .find(|(keyword, expansion)| rewritten.contains(keyword) && !rewritten.contains(expansion))
    {
        rewritten = format!("{expansion} {rewritten}");
    }

    let optimized = rewritten.split_whitespace().collect::<Vec<_>>().join(" ");
    debug!(
        event_name = "search.query.optimized",
        original = %query,
        optimized = %optimized,
        "rewrote search query"
    );
    optimized
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BoundKind {
    Ceiling,
    Span,
}

struct PricePattern {
    kind: BoundKind,
    regex: Regex,
}

fn price_patterns() -> &'static [PricePattern] {
    static PATTERNS: OnceLock<Vec<PricePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (BoundKind::Ceiling, r"under\s*\$?(\d+)"),
            (BoundKind::Ceiling, r"below\s*\$?(\d+)"),
            (BoundKind::Ceiling, r"less than\s*\$?(\d+)"),
            (BoundKind::Span, r"\$?(\d+)\s*-\s*\$?(\d+)"),
            (BoundKind::Span, r"between\s*\$?(\d+)\s*and\s*\$?(\d+)"),
            (BoundKind::Span, r"\$?(\d+)\s*to\s*\$?(\d+)"),
        ]
        .into_iter()
        .map(|(kind, pattern)| PricePattern {
            kind,
            regex: Regex::new(pattern).expect("price range pattern is valid"),
        })
        .collect()
    })
}

/// First matching pattern in priority order wins; ceilings beat spans. A
/// matched figure too large to read leaves the range empty.
pub fn extract_price_range(query: &str) -> PriceRange {
    let lowered = query.to_lowercase();

    let first_match = price_patterns().iter().find_map(|pattern| {
        pattern.regex.captures(&lowered).map(|captures| (pattern.kind, captures))
    });
    let Some((kind, captures)) = first_match else {
        return PriceRange::default();
    };
    let bound =
        |index: usize| captures.get(index).and_then(|figure| figure.as_str().parse::<u64>().ok());

    match kind {
        BoundKind::Ceiling => match bound(1) {
            Some(max) => PriceRange::new(None, Some(max)),
            None => PriceRange::default(),
        },
        BoundKind::Span => match (bound(1), bound(2)) {
            (Some(min), Some(max)) => PriceRange::new(Some(min), Some(max)),
            _ => PriceRange::default(),
        },
    }
}
