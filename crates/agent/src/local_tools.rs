//! In-process versions of the shopping tools, for hosts that serve them
//! locally instead of through the gateway.

use anyhow::{Context, Result};
use async_trait::async_trait;
use concierge_core::{PackingListGenerator, ProductSearch, SearchOrchestrator};
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{Tool, ToolRegistry};

pub const SINGLE_PRODUCT_SEARCH: &str = "single_productsearch";
pub const PACKING_LIST: &str = "generate_packinglist_with_productASINS";

pub(crate) const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Deserialize)]
struct ToolInput {
    #[serde(default)]
    user_id: Option<String>,
    question: String,
}

impl ToolInput {
    fn parse(tool: &str, input: Value) -> Result<Self> {
        serde_json::from_value(input).with_context(|| format!("invalid input for `{tool}`"))
    }

    fn user_id(&self) -> &str {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty()).unwrap_or(ANONYMOUS_USER)
    }
}

pub struct SingleProductSearchTool {
    orchestrator: SearchOrchestrator,
}

impl SingleProductSearchTool {
    pub fn new(orchestrator: SearchOrchestrator) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Tool for SingleProductSearchTool {
    fn name(&self) -> &str {
        SINGLE_PRODUCT_SEARCH
    }

    fn description(&self) -> &str {
        "Search for products matching a free-text question."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input = ToolInput::parse(SINGLE_PRODUCT_SEARCH, input)?;
        let list = self.orchestrator.search_products(input.user_id(), &input.question).await;
        Ok(serde_json::to_value(list)?)
    }
}

pub struct PackingListTool {
    generator: PackingListGenerator,
}

impl PackingListTool {
    pub fn new(generator: PackingListGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Tool for PackingListTool {
    fn name(&self) -> &str {
        PACKING_LIST
    }

    fn description(&self) -> &str {
        "Build a packing list for a trip with product picks for each item."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input = ToolInput::parse(PACKING_LIST, input)?;
        let answer = self.generator.generate_packing_list(input.user_id(), &input.question).await;
        Ok(serde_json::to_value(answer)?)
    }
}

/// Both shopping tools served from one search pipeline.
pub fn local_registry(search: ProductSearch) -> ToolRegistry {
    let mut registry = ToolRegistry::default();
    registry.register(SingleProductSearchTool::new(SearchOrchestrator::new(search.clone())));
    registry.register(PackingListTool::new(PackingListGenerator::new(search)));
    registry
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use concierge_core::{
        PackingListGenerator, ProductSearch, ProviderError, RawProduct, SearchOrchestrator,
        SearchProvider, SearchQuery,
    };
    use serde_json::json;

    use super::{local_registry, PackingListTool, SingleProductSearchTool};
    use crate::tools::{Tool, ToolRegistry};

    struct OneBottle;

    #[async_trait]
    impl SearchProvider for OneBottle {
        async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<RawProduct>, ProviderError> {
            let record = json!({
                "asin": "B0BOTTLE",
                "title": "Insulated Bottle",
                "price": "$24.99",
                "rating": 4.6,
                "reviews": 1200
            });
            Ok(vec![serde_json::from_value(record).expect("record decodes")])
        }
    }

    fn search() -> ProductSearch {
        ProductSearch::new(Arc::new(OneBottle))
    }

    #[tokio::test]
    async fn product_search_tool_returns_product_list_json() {
        let tool = SingleProductSearchTool::new(SearchOrchestrator::new(search()));

        let output = tool.execute(json!({"question": "water bottle"})).await.expect("executes");

        assert_eq!(output["asins"], json!(["B0BOTTLE"]));
        assert!(output["answer"].as_str().is_some_and(|answer| answer.contains("B0BOTTLE")));
    }

    #[tokio::test]
    async fn packing_tool_is_registered_under_its_wire_name() {
        let mut registry = ToolRegistry::default();
        registry.register(PackingListTool::new(PackingListGenerator::new(search())));

        let output = registry
            .execute(
                "generate_packinglist_with_productASINS",
                json!({"user_id": "u-7", "question": "a weekend trip"}),
            )
            .await
            .expect("executes");

        assert!(output["asins"].as_object().is_some_and(|asins| !asins.is_empty()));
        assert!(output["answer"].is_string());
    }

    #[tokio::test]
    async fn missing_question_is_rejected() {
        let tool = SingleProductSearchTool::new(SearchOrchestrator::new(search()));
        let error = tool.execute(json!({"user_id": "u-1"})).await.err();
        assert!(error
            .map(|err| err.to_string().contains("single_productsearch"))
            .unwrap_or(false));
    }

    #[test]
    fn local_registry_serves_both_tools() {
        let registry = local_registry(search());
        assert_eq!(
            registry.names(),
            vec!["single_productsearch", "generate_packinglist_with_productASINS"]
        );
    }
}
