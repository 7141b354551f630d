//! Client for the JSON-RPC tool gateway that fronts the shopping and cart tools.

pub mod client;
pub mod error;
pub mod filter;
pub mod protocol;

pub use client::GatewayClient;
pub use error::GatewayError;
pub use filter::ToolFilter;
pub use protocol::{ContentBlock, InitializeResult, ToolCallResult, ToolDescriptor};
