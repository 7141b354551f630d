use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use concierge_gateway::{GatewayClient, ToolDescriptor};
use indexmap::IndexMap;
use serde_json::Value;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    async fn execute(&self, input: Value) -> Result<Value>;
}

/// Tools an agent may call, keyed by name in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub async fn execute(&self, name: &str, input: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| anyhow!("unknown tool `{name}`"))?;
        tool.execute(input).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A remote gateway tool exposed through the local [`Tool`] seam.
pub struct GatewayTool {
    client: Arc<GatewayClient>,
    descriptor: ToolDescriptor,
}

impl GatewayTool {
    pub fn new(client: Arc<GatewayClient>, descriptor: ToolDescriptor) -> Self {
        Self { client, descriptor }
    }

    pub fn input_schema(&self) -> &Value {
        &self.descriptor.input_schema
    }
}

#[async_trait]
impl Tool for GatewayTool {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn description(&self) -> &str {
        self.descriptor.description.as_deref().unwrap_or_default()
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let result = self.client.call_tool(&self.descriptor.name, input).await?;
        Ok(serde_json::to_value(result)?)
    }
}
