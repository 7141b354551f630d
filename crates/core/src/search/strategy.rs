//! Ordered query reformulations and the combinator that walks them.

use std::future::Future;

use crate::search::normalize::optimize_search_query;

const QUALITY_WORDS: &[&str] = &["best", "top", "good", "recommend"];
const BUDGET_WORDS: &[&str] = &["cheap", "budget"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStrategy {
    Original,
    Optimized,
    BestRated,
    Budget,
}

impl QueryStrategy {
    pub const ORDER: [QueryStrategy; 4] =
        [Self::Original, Self::Optimized, Self::BestRated, Self::Budget];

    pub fn label(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Optimized => "optimized",
            Self::BestRated => "best_rated",
            Self::Budget => "budget",
        }
    }

    /// The query this strategy would send, or `None` when it does not apply.
    pub fn apply(self, question: &str) -> Option<String> {
        let lowered = question.to_lowercase();
        match self {
            Self::Original => Some(question.to_string()),
            Self::Optimized => Some(optimize_search_query(question)),
            Self::BestRated => mentions_any(&lowered, QUALITY_WORDS)
                .then(|| format!("best rated {}", optimize_search_query(question))),
            Self::Budget => mentions_any(&lowered, BUDGET_WORDS)
                .then(|| format!("budget {}", optimize_search_query(question))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryVariant {
    pub strategy: QueryStrategy,
    pub query: String,
}

pub fn query_variants(question: &str) -> Vec<QueryVariant> {
    QueryStrategy::ORDER
        .iter()
        .filter_map(|strategy| {
            strategy.apply(question).map(|query| QueryVariant { strategy: *strategy, query })
        })
        .collect()
}

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Fallback<T> {
    /// `attempt` is 1-based.
    Found { attempt: usize, value: T },
    Exhausted { attempts: usize, last_error: Option<String> },
}

impl<T> Fallback<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Found { value, .. } => Some(value),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Runs `attempt` over `variants` in order and stops at the first `Ok`.
/// Failures only record their reason; the last one is reported when every
/// variant fails.
pub async fn first_success<V, T, F, Fut>(
    variants: impl IntoIterator<Item = V>,
    mut attempt: F,
) -> Fallback<T>
where
    F: FnMut(V) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut attempts = 0;
    let mut last_error = None;

    for variant in variants {
        attempts += 1;
        match attempt(variant).await {
            Ok(value) => return Fallback::Found { attempt: attempts, value },
            Err(reason) => last_error = Some(reason),
        }
    }

    Fallback::Exhausted { attempts, last_error }
}
