use regex::Regex;

use crate::error::GatewayError;
use crate::protocol::ToolDescriptor;

/// Tool-name pattern, e.g. `^carttools___`.
#[derive(Clone, Debug)]
pub struct ToolFilter {
    pattern: Regex,
}

impl ToolFilter {
    pub fn new(pattern: &str) -> Result<Self, GatewayError> {
        Regex::new(pattern).map(|pattern| Self { pattern }).map_err(|err| {
            GatewayError::NotConfigured(format!("invalid tool filter `{pattern}`: {err}"))
        })
    }

    /// Matches names starting with `prefix`, taken literally.
    pub fn prefix(prefix: &str) -> Self {
        let pattern = format!("^{}", regex::escape(prefix));
        Self { pattern: Regex::new(&pattern).expect("escaped prefix is a valid regex") }
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    pub fn apply(&self, tools: Vec<ToolDescriptor>) -> Vec<ToolDescriptor> {
        tools.into_iter().filter(|tool| self.matches(&tool.name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ToolFilter;

    #[test]
    fn regex_filter_keeps_matching_names() {
        let filter = ToolFilter::new("^carttools___").expect("valid");
        assert!(filter.matches("carttools___add_to_cart"));
        assert!(!filter.matches("shoppingtools___single_productsearch"));
    }

    #[test]
    fn prefix_is_literal() {
        let filter = ToolFilter::prefix("a.b");
        assert!(filter.matches("a.b_tool"));
        assert!(!filter.matches("axb_tool"));
        assert_eq!(filter.as_str(), "^a\\.b");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(ToolFilter::new("^(unclosed").is_err());
    }
}
