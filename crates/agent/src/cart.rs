use std::sync::Arc;

use chrono::{Local, NaiveDate};
use concierge_gateway::{GatewayClient, ToolFilter};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::guardrails::{GuardrailDecision, GuardrailPolicy};
use crate::llm::{AgentRequest, LlmClient, ModelSettings, TraceAttributes};
use crate::prompts::cart_prompt;
use crate::reply::{SubagentReply, SubagentRequest};
use crate::tools::{GatewayTool, ToolRegistry};

pub const CART_TOOL_PREFIX: &str = "carttools___";

const AGENT_NAME: &str = "cart_agent";
const AGENT_TYPE: &str = "cart_subagent";

/// Cart management and checkout through the gateway's cart tools.
pub struct CartSubagent {
    gateway: Arc<GatewayClient>,
    llm: Arc<dyn LlmClient>,
    model: ModelSettings,
    guardrails: GuardrailPolicy,
    today: Option<NaiveDate>,
}

impl CartSubagent {
    pub fn new(gateway: Arc<GatewayClient>, llm: Arc<dyn LlmClient>, model: ModelSettings) -> Self {
        Self { gateway, llm, model, guardrails: GuardrailPolicy::default(), today: None }
    }

    pub fn with_guardrails(mut self, guardrails: GuardrailPolicy) -> Self {
        self.guardrails = guardrails;
        self
    }

    /// Pins the date woven into the prompt; the local date is used otherwise.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub async fn handle(&self, request: &SubagentRequest) -> SubagentReply {
        let correlation_id = Uuid::new_v4().to_string();
        let user_id = request.user_id();
        info!(
            event_name = "cart.request.start",
            correlation_id = %correlation_id,
            user_id = %user_id,
            "cart request received"
        );

        let decision = self.guardrails.evaluate_cart_query(&request.query);
        if let GuardrailDecision::Deny { reason_code, user_message, fallback_path }
        | GuardrailDecision::Degrade { reason_code, user_message, fallback_path } = decision
        {
            warn!(
                event_name = "cart.guardrail.blocked",
                correlation_id = %correlation_id,
                reason_code,
                fallback_path,
                "cart request stopped by guardrail"
            );
            return SubagentReply::Result(user_message);
        }

        let filter = ToolFilter::prefix(CART_TOOL_PREFIX);
        let tools = match self.gateway.list_tools(Some(&filter)).await {
            Ok(tools) => tools,
            Err(err) => {
                error!(
                    event_name = "cart.gateway.unavailable",
                    correlation_id = %correlation_id,
                    error_code = err.error_code(),
                    error = %err,
                    "could not load cart tools"
                );
                return SubagentReply::Error(err.to_string());
            }
        };

        let mut registry = ToolRegistry::default();
        for descriptor in tools {
            registry.register(GatewayTool::new(self.gateway.clone(), descriptor));
        }

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let agent_request = AgentRequest {
            agent_name: AGENT_NAME,
            system_prompt: cart_prompt(today, user_id),
            query: request.query.clone(),
            tools: registry,
            model: self.model.clone(),
            trace: TraceAttributes {
                user_id: user_id.to_string(),
                session_id: request.session_id().to_string(),
                agent_type: AGENT_TYPE,
            },
        };

        match self.llm.invoke(&agent_request).await {
            Ok(text) => {
                info!(
                    event_name = "cart.request.completed",
                    correlation_id = %correlation_id,
                    "cart request finished"
                );
                SubagentReply::Result(text)
            }
            Err(err) => {
                error!(
                    event_name = "cart.agent.failed",
                    correlation_id = %correlation_id,
                    error = %err,
                    "cart agent failed"
                );
                SubagentReply::Error(err.to_string())
            }
        }
    }
}
