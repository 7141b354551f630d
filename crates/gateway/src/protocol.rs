//! JSON-RPC 2.0 envelopes and the tool payloads carried inside them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2025-03-26";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_LIST_TOOLS: &str = "tools/list";
pub const METHOD_CALL_TOOL: &str = "tools/call";

#[derive(Clone, Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, id, method, params }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub server_info: Option<ServerInfo>,
    #[serde(default)]
    pub capabilities: Value,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ServerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Text of the first content block, if that block is non-empty text.
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ContentBlock::Text { text }) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![ContentBlock::Text { text: text.into() }], is_error: false }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ContentBlock, RpcRequest, ToolCallResult};

    #[test]
    fn request_serializes_as_jsonrpc_two() {
        let request = RpcRequest::new(7, "tools/list", json!({}));
        let value = serde_json::to_value(&request).expect("serializes");
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list", "params": {}}));
    }

    #[test]
    fn unknown_content_blocks_are_tolerated() {
        let result: ToolCallResult = serde_json::from_value(json!({
            "content": [{"type": "image", "data": "...", "mimeType": "image/png"}],
            "isError": false
        }))
        .expect("decodes");
        assert_eq!(result.content, vec![ContentBlock::Unsupported]);
        assert_eq!(result.first_text(), None);
    }

    #[test]
    fn first_text_reads_only_the_first_block() {
        let result: ToolCallResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "{\"answer\": \"hi\"}"}, {"type": "text", "text": "later"}]
        }))
        .expect("decodes");
        assert_eq!(result.first_text(), Some("{\"answer\": \"hi\"}"));
        assert!(!result.is_error);
    }
}
