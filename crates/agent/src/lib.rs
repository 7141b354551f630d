//! Shopping and cart subagents.
//!
//! Each subagent takes a [`SubagentRequest`] from the orchestrating agent and
//! always answers with a [`SubagentReply`]:
//!
//! - [`ShoppingSubagent`] finds products through the gateway's shopping tools,
//!   either by keyword routing (`direct`) or by handing the registry of
//!   gateway tools to the model (`agent`).
//! - [`CartSubagent`] screens the request with [`GuardrailPolicy`] and then
//!   lets the model drive the gateway's cart tools.
//!
//! The model loop itself sits behind [`LlmClient`]; this crate builds the
//! prompts, tool registries and trace attributes it is given.

pub mod cart;
pub mod guardrails;
pub mod llm;
pub mod local_tools;
pub mod prompts;
pub mod reply;
pub mod runtime;
pub mod shopping;
pub mod tools;

pub use cart::CartSubagent;
pub use guardrails::{GuardrailDecision, GuardrailPolicy};
pub use llm::{AgentRequest, DetachedLlm, LlmClient, ModelSettings, TraceAttributes};
pub use local_tools::{local_registry, PackingListTool, SingleProductSearchTool};
pub use reply::{SubagentReply, SubagentRequest};
pub use runtime::{AgentRuntime, SubagentKind};
pub use shopping::ShoppingSubagent;
pub use tools::{GatewayTool, Tool, ToolRegistry};
