use std::sync::Arc;

use concierge_core::config::ShoppingDispatch;
use concierge_gateway::{GatewayClient, GatewayError, ToolCallResult, ToolFilter};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::llm::{AgentRequest, LlmClient, ModelSettings, TraceAttributes};
use crate::prompts::enhanced_shopping_prompt;
use crate::reply::{SubagentReply, SubagentRequest};
use crate::tools::{GatewayTool, ToolRegistry};

pub const SHOPPING_TOOL_PREFIX: &str = "shoppingtools___";
pub const SEARCH_TOOL: &str = "shoppingtools___single_productsearch";
pub const PACKING_TOOL: &str = "shoppingtools___generate_packinglist_with_productASINS";
pub const CLIENT_VERSION: &str = "1.0.0";

const AGENT_NAME: &str = "shopping_agent";
const AGENT_TYPE: &str = "shopping_subagent";

const PACKING_WORDS: [&str; 5] = ["packing", "pack", "trip", "vacation", "travel list"];
const SIMPLE_QUERY_TERMS: [&str; 5] = ["water bottle", "find", "search", "show me", "get me"];

const FORMAT_FALLBACK: &str =
    "I found some products but couldn't format the results properly. Please try again.";
const VAGUE_QUERY_FALLBACK: &str = "I can help you find products! Let me search for what \
you're looking for. Please be more specific about what type of product you need.";

/// Product discovery on behalf of the orchestrating agent. Always produces a
/// reply; gateway trouble is reported as text.
pub struct ShoppingSubagent {
    gateway: Arc<GatewayClient>,
    llm: Arc<dyn LlmClient>,
    model: ModelSettings,
    dispatch: ShoppingDispatch,
    client_name: String,
}

impl ShoppingSubagent {
    pub fn new(
        gateway: Arc<GatewayClient>,
        llm: Arc<dyn LlmClient>,
        model: ModelSettings,
        dispatch: ShoppingDispatch,
        client_name: impl Into<String>,
    ) -> Self {
        Self { gateway, llm, model, dispatch, client_name: client_name.into() }
    }

    pub fn dispatch(&self) -> ShoppingDispatch {
        self.dispatch
    }

    pub async fn handle(&self, request: &SubagentRequest) -> SubagentReply {
        let correlation_id = Uuid::new_v4().to_string();
        info!(
            event_name = "shopping.request.start",
            correlation_id = %correlation_id,
            user_id = %request.user_id(),
            dispatch = self.dispatch.as_str(),
            "shopping request received"
        );

        let reply = match self.dispatch {
            ShoppingDispatch::Direct => self.handle_direct(request, &correlation_id).await,
            ShoppingDispatch::Agent => self.handle_with_agent(request, &correlation_id).await,
        };

        info!(
            event_name = "shopping.request.completed",
            correlation_id = %correlation_id,
            is_error = reply.is_error(),
            "shopping request finished"
        );
        reply
    }

    async fn handle_direct(&self, request: &SubagentRequest, correlation_id: &str) -> SubagentReply {
        match self.call_direct(request).await {
            Ok(result) => SubagentReply::Result(direct_answer(&result)),
            Err(err) => {
                error!(
                    event_name = "shopping.direct.failed",
                    correlation_id = %correlation_id,
                    error_code = err.error_code(),
                    error = %err,
                    "direct gateway call failed"
                );
                SubagentReply::Result(connectivity_fallback(&request.query))
            }
        }
    }

    async fn call_direct(&self, request: &SubagentRequest) -> Result<ToolCallResult, GatewayError> {
        self.gateway.initialize(&self.client_name, CLIENT_VERSION).await?;
        let tool = direct_tool_for(&request.query);
        info!(event_name = "shopping.direct.tool_selected", tool, "calling gateway tool");
        self.gateway.call_tool(tool, tool_arguments(request)).await
    }

    async fn handle_with_agent(
        &self,
        request: &SubagentRequest,
        correlation_id: &str,
    ) -> SubagentReply {
        let filter = ToolFilter::prefix(SHOPPING_TOOL_PREFIX);
        let tools = match self.gateway.list_tools(Some(&filter)).await {
            Ok(tools) => tools,
            Err(err) => {
                error!(
                    event_name = "shopping.gateway.unavailable",
                    correlation_id = %correlation_id,
                    error_code = err.error_code(),
                    error = %err,
                    "could not load shopping tools"
                );
                return SubagentReply::Result(connectivity_fallback(&request.query));
            }
        };

        if is_simple_query(&request.query) {
            let search_tool = tools.iter().find(|tool| tool.name.to_lowercase().contains("search"));
            let attempt = match search_tool {
                Some(tool) => {
                    self.gateway.call_tool(&tool.name, tool_arguments(request)).await.map(Some)
                }
                None => Ok(None),
            };
            match attempt {
                Ok(result) => {
                    let text = result.as_ref().and_then(simple_answer);
                    return SubagentReply::Result(
                        text.unwrap_or_else(|| VAGUE_QUERY_FALLBACK.to_string()),
                    );
                }
                Err(err) => warn!(
                    event_name = "shopping.simple_search.failed",
                    correlation_id = %correlation_id,
                    error = %err,
                    "direct search tool call failed, handing over to the model"
                ),
            }
        }

        let mut registry = ToolRegistry::default();
        for descriptor in tools {
            registry.register(GatewayTool::new(self.gateway.clone(), descriptor));
        }

        let agent_request = AgentRequest {
            agent_name: AGENT_NAME,
            system_prompt: enhanced_shopping_prompt(
                request.user_id(),
                request.session_id(),
                &request.query,
            ),
            query: request.query.clone(),
            tools: registry,
            model: self.model.clone(),
            trace: TraceAttributes {
                user_id: request.user_id().to_string(),
                session_id: request.session_id().to_string(),
                agent_type: AGENT_TYPE,
            },
        };

        match self.llm.invoke(&agent_request).await {
            Ok(text) => SubagentReply::Result(text),
            Err(err) if is_tool_pairing_error(&err) => {
                warn!(
                    event_name = "shopping.agent.degraded",
                    correlation_id = %correlation_id,
                    error = %err,
                    "model rejected the tool conversation structure"
                );
                SubagentReply::Result(format!(
                    "I understand you're looking for products related to: {}. Let me help you \
                     find some options.",
                    request.query
                ))
            }
            Err(err) => {
                error!(
                    event_name = "shopping.agent.failed",
                    correlation_id = %correlation_id,
                    error = %err,
                    "shopping agent failed"
                );
                SubagentReply::Error(err.to_string())
            }
        }
    }
}

pub fn direct_tool_for(query: &str) -> &'static str {
    let lowered = query.to_lowercase();
    if PACKING_WORDS.iter().any(|word| lowered.contains(word)) {
        PACKING_TOOL
    } else {
        SEARCH_TOOL
    }
}

pub fn is_simple_query(query: &str) -> bool {
    let lowered = query.to_lowercase();
    SIMPLE_QUERY_TERMS.iter().any(|term| lowered.contains(term))
}

pub fn connectivity_fallback(query: &str) -> String {
    format!(
        "I apologize, but I'm currently unable to connect to the shopping tools service. This \
appears to be a temporary connectivity issue.

**Your request:** {query}

**What I would normally do:**
- Search Amazon for real products matching your request
- Provide actual product ASINs, prices, and direct purchase links
- Show ratings, reviews, and Prime availability
- Suggest specific products you can add to cart immediately

**Temporary workaround:**
While I work to restore the connection, you can search directly on Amazon for: {query}

**Status:** The shopping tools service is experiencing connectivity issues. This is typically \
resolved quickly. Please try again in a few minutes."
    )
}

fn tool_arguments(request: &SubagentRequest) -> Value {
    json!({"user_id": request.user_id(), "question": request.query})
}

/// `answer` of a JSON payload, else the raw text, else the formatting fallback.
fn direct_answer(result: &ToolCallResult) -> String {
    let Some(text) = result.first_text() else {
        return FORMAT_FALLBACK.to_string();
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(mut payload)) => match payload.remove("answer") {
            Some(answer) => answer_text(answer),
            None => text.to_string(),
        },
        _ => text.to_string(),
    }
}

/// Like [`direct_answer`], except a JSON payload without an answer yields
/// nothing so the caller can fall back.
fn simple_answer(result: &ToolCallResult) -> Option<String> {
    let text = result.first_text()?;
    match serde_json::from_str::<Value>(text) {
        Ok(payload) => payload
            .get("answer")
            .filter(|answer| is_truthy(answer))
            .cloned()
            .map(answer_text),
        Err(_) => Some(text.to_string()),
    }
}

fn answer_text(answer: Value) -> String {
    match answer {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
    }
}

fn is_tool_pairing_error(err: &anyhow::Error) -> bool {
    let message = format!("{err:#}");
    message.contains("toolResult blocks") && message.contains("toolUse blocks")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use concierge_core::config::{AppConfig, ShoppingDispatch};
    use concierge_gateway::{GatewayClient, ToolCallResult};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{
        connectivity_fallback, direct_answer, direct_tool_for, is_simple_query, simple_answer,
        ShoppingSubagent, PACKING_TOOL, SEARCH_TOOL, VAGUE_QUERY_FALLBACK,
    };
    use crate::llm::testing::ScriptedLlm;
    use crate::llm::ModelSettings;
    use crate::reply::{SubagentReply, SubagentRequest};

    fn agent_subagent(server: &MockServer, llm: Arc<ScriptedLlm>) -> ShoppingSubagent {
        let gateway = GatewayClient::new(format!("{}/mcp", server.uri()), "t".to_string().into());
        ShoppingSubagent::new(
            Arc::new(gateway),
            llm,
            ModelSettings::shopping(&AppConfig::default().llm),
            ShoppingDispatch::Agent,
            "shopping-assistant",
        )
    }

    async fn mount_tools(server: &MockServer) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "tools/list"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "result": {"tools": [
                    {"name": "shoppingtools___generate_packinglist_with_productASINS"},
                    {"name": "shoppingtools___single_productsearch"},
                    {"name": "carttools___get_cart"}
                ]}
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn packing_words_route_to_packing_tool() {
        assert_eq!(direct_tool_for("Packing list for Iceland"), PACKING_TOOL);
        assert_eq!(direct_tool_for("a beach vacation"), PACKING_TOOL);
        assert_eq!(direct_tool_for("backpack under $80"), PACKING_TOOL);
        assert_eq!(direct_tool_for("noise cancelling headphones"), SEARCH_TOOL);
    }

    #[test]
    fn simple_terms_are_substring_matches() {
        assert!(is_simple_query("Find me a tent"));
        assert!(is_simple_query("water bottles please"));
        assert!(is_simple_query("Show me laptops"));
        assert!(!is_simple_query("what should I wear hiking"));
    }

    #[test]
    fn direct_answer_prefers_json_answer_then_raw_text() {
        let json_answer = ToolCallResult::text(r#"{"answer": "Found 3 tents", "asins": []}"#);
        let no_answer = ToolCallResult::text(r#"{"asins": ["B0X"]}"#);
        let raw = ToolCallResult::text("plain text reply");

        assert_eq!(direct_answer(&json_answer), "Found 3 tents");
        assert_eq!(direct_answer(&no_answer), r#"{"asins": ["B0X"]}"#);
        assert_eq!(direct_answer(&raw), "plain text reply");
        assert_eq!(
            direct_answer(&ToolCallResult::default()),
            "I found some products but couldn't format the results properly. Please try again."
        );
    }

    #[test]
    fn simple_answer_needs_a_non_empty_answer_from_json() {
        assert_eq!(
            simple_answer(&ToolCallResult::text(r#"{"answer": "ok"}"#)).as_deref(),
            Some("ok")
        );
        assert_eq!(simple_answer(&ToolCallResult::text(r#"{"answer": ""}"#)), None);
        assert_eq!(simple_answer(&ToolCallResult::text("{not json")).as_deref(), Some("{not json"));
        assert_eq!(simple_answer(&ToolCallResult::default()), None);
    }

    #[test]
    fn connectivity_fallback_restates_the_request_twice() {
        let text = connectivity_fallback("hiking boots");
        assert!(text.starts_with("I apologize, but I'm currently unable to connect"));
        assert!(text.contains("**Your request:** hiking boots"));
        assert!(text.contains("search directly on Amazon for: hiking boots"));
        assert!(text.ends_with("Please try again in a few minutes."));
    }

    #[tokio::test]
    async fn agent_dispatch_hands_complex_queries_to_the_model() {
        let server = MockServer::start().await;
        mount_tools(&server).await;
        let llm = Arc::new(ScriptedLlm::replying(vec![Ok("Here are three tents")]));
        let subagent = agent_subagent(&server, llm.clone());

        let request =
            SubagentRequest::new("what tent suits two people").with_user("u-9").with_session("s-1");
        let reply = subagent.handle(&request).await;

        assert_eq!(reply, SubagentReply::Result("Here are three tents".to_string()));
        let seen = llm.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].agent_name, "shopping_agent");
        assert_eq!(seen[0].query, "what tent suits two people");
        assert_eq!(
            seen[0].tool_names,
            vec![
                "shoppingtools___generate_packinglist_with_productASINS",
                "shoppingtools___single_productsearch"
            ]
        );
        assert_eq!(seen[0].trace.agent_type, "shopping_subagent");
        assert_eq!(seen[0].trace.session_id, "s-1");
        assert!(seen[0].system_prompt.contains("- User ID: u-9"));
        assert_eq!(seen[0].model.temperature, 0.2);
    }

    #[tokio::test]
    async fn simple_query_uses_search_tool_without_the_model() {
        let server = MockServer::start().await;
        mount_tools(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "tools/call",
                "params": {"name": "shoppingtools___single_productsearch"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "result": {"content": [{"type": "text", "text": "{\"answer\": \"3 bottles\"}"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let llm = Arc::new(ScriptedLlm::default());
        let subagent = agent_subagent(&server, llm.clone());

        let reply = subagent.handle(&SubagentRequest::new("find a water bottle")).await;

        assert_eq!(reply, SubagentReply::Result("3 bottles".to_string()));
        assert!(llm.seen().is_empty());
    }

    #[tokio::test]
    async fn simple_query_without_answer_asks_for_specifics() {
        let server = MockServer::start().await;
        mount_tools(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "tools/call"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "result": {"content": [{"type": "text", "text": "{\"asins\": []}"}]}
            })))
            .mount(&server)
            .await;
        let subagent = agent_subagent(&server, Arc::new(ScriptedLlm::default()));

        let reply = subagent.handle(&SubagentRequest::new("search for socks")).await;

        assert_eq!(reply, SubagentReply::Result(VAGUE_QUERY_FALLBACK.to_string()));
    }

    #[tokio::test]
    async fn failed_simple_search_falls_through_to_the_model() {
        let server = MockServer::start().await;
        mount_tools(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "tools/call"})))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        let llm = Arc::new(ScriptedLlm::replying(vec![Ok("model answer")]));
        let subagent = agent_subagent(&server, llm.clone());

        let reply = subagent.handle(&SubagentRequest::new("show me rain jackets")).await;

        assert_eq!(reply, SubagentReply::Result("model answer".to_string()));
        assert_eq!(llm.seen().len(), 1);
    }

    #[tokio::test]
    async fn tool_pairing_errors_degrade_and_other_errors_surface() {
        let server = MockServer::start().await;
        mount_tools(&server).await;
        let llm = Arc::new(ScriptedLlm::replying(vec![
            Err("ValidationException: The number of toolResult blocks exceeds the number of \
                 toolUse blocks of previous turn."),
            Err("model throttled"),
        ]));
        let subagent = agent_subagent(&server, llm);
        let request = SubagentRequest::new("gift ideas for a cyclist");

        assert_eq!(
            subagent.handle(&request).await,
            SubagentReply::Result(
                "I understand you're looking for products related to: gift ideas for a cyclist. \
                 Let me help you find some options."
                    .to_string()
            )
        );
        assert_eq!(subagent.handle(&request).await, SubagentReply::Error("model throttled".to_string()));
    }

    #[tokio::test]
    async fn unreachable_gateway_yields_connectivity_fallback_in_agent_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let llm = Arc::new(ScriptedLlm::default());
        let subagent = agent_subagent(&server, llm.clone());

        let reply = subagent.handle(&SubagentRequest::new("gift ideas")).await;

        assert_eq!(reply, SubagentReply::Result(connectivity_fallback("gift ideas")));
        assert!(llm.seen().is_empty());
    }
}
