use std::sync::Arc;

use concierge_core::config::AppConfig;
use concierge_gateway::{GatewayClient, GatewayError};
use serde::{Deserialize, Serialize};

use crate::cart::CartSubagent;
use crate::guardrails::GuardrailPolicy;
use crate::llm::{LlmClient, ModelSettings};
use crate::reply::{SubagentReply, SubagentRequest};
use crate::shopping::ShoppingSubagent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubagentKind {
    Shopping,
    Cart,
}

/// Both subagents wired to one shared gateway client.
pub struct AgentRuntime {
    gateway: Arc<GatewayClient>,
    shopping: ShoppingSubagent,
    cart: CartSubagent,
}

impl AgentRuntime {
    pub fn new(gateway: Arc<GatewayClient>, shopping: ShoppingSubagent, cart: CartSubagent) -> Self {
        Self { gateway, shopping, cart }
    }

    pub fn from_config(config: &AppConfig, llm: Arc<dyn LlmClient>) -> Result<Self, GatewayError> {
        let gateway = Arc::new(GatewayClient::from_config(&config.gateway)?);
        let shopping = ShoppingSubagent::new(
            gateway.clone(),
            llm.clone(),
            ModelSettings::shopping(&config.llm),
            config.shopping.dispatch,
            config.gateway.client_name.clone(),
        );
        let cart = CartSubagent::new(gateway.clone(), llm, ModelSettings::cart(&config.llm))
            .with_guardrails(GuardrailPolicy::default());
        Ok(Self::new(gateway, shopping, cart))
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    pub fn shopping(&self) -> &ShoppingSubagent {
        &self.shopping
    }

    pub fn cart(&self) -> &CartSubagent {
        &self.cart
    }

    pub async fn handle(&self, kind: SubagentKind, request: &SubagentRequest) -> SubagentReply {
        match kind {
            SubagentKind::Shopping => self.shopping.handle(request).await,
            SubagentKind::Cart => self.cart.handle(request).await,
        }
    }
}
