use anyhow::{bail, Result};
use async_trait::async_trait;
use concierge_core::config::LlmConfig;

use crate::tools::ToolRegistry;

/// The model-driven agent loop. Implementations own tool selection and call
/// the registry's tools themselves; the returned text is the final answer.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, request: &AgentRequest) -> Result<String>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelSettings {
    pub model_id: String,
    pub region: String,
    pub temperature: f32,
}

impl ModelSettings {
    pub fn shopping(config: &LlmConfig) -> Self {
        Self {
            model_id: config.shopping_model.clone(),
            region: config.region.clone(),
            temperature: config.shopping_temperature,
        }
    }

    pub fn cart(config: &LlmConfig) -> Self {
        Self {
            model_id: config.cart_model.clone(),
            region: config.region.clone(),
            temperature: config.cart_temperature,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceAttributes {
    pub user_id: String,
    pub session_id: String,
    pub agent_type: &'static str,
}

impl TraceAttributes {
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("user.id", self.user_id.as_str()),
            ("session.id", self.session_id.as_str()),
            ("agent.type", self.agent_type),
        ]
    }
}

pub struct AgentRequest {
    pub agent_name: &'static str,
    pub system_prompt: String,
    pub query: String,
    pub tools: ToolRegistry,
    pub model: ModelSettings,
    pub trace: TraceAttributes,
}

/// Stand-in used when no model runtime is attached; every invocation fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedLlm;

#[async_trait]
impl LlmClient for DetachedLlm {
    async fn invoke(&self, request: &AgentRequest) -> Result<String> {
        bail!("no model runtime is attached for agent `{}`", request.agent_name)
    }
}
