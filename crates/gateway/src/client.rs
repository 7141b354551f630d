use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use concierge_core::config::GatewayConfig;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::filter::ToolFilter;
use crate::protocol::{
    InitializeResult, ListToolsResult, RpcRequest, RpcResponse, ToolCallResult, ToolDescriptor,
    METHOD_CALL_TOOL, METHOD_INITIALIZE, METHOD_LIST_TOOLS, PROTOCOL_VERSION,
};

const MAX_TOOL_PAGES: usize = 20;
const ERROR_BODY_LIMIT: usize = 200;

/// JSON-RPC client for the tool gateway. Request ids are sequential per
/// client and start at 1; the client is safe to share across tasks.
pub struct GatewayClient {
    http: Client,
    url: String,
    access_token: SecretString,
    control_timeout: Duration,
    data_timeout: Duration,
    next_id: AtomicU64,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("url", &self.url)
            .field("control_timeout", &self.control_timeout)
            .field("data_timeout", &self.data_timeout)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    pub fn new(url: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            access_token,
            control_timeout: Duration::from_secs(10),
            data_timeout: Duration::from_secs(30),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let url = config
            .url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| GatewayError::NotConfigured("gateway.url is not set".to_string()))?;
        let access_token = config
            .access_token
            .clone()
            .filter(|token| !token.expose_secret().trim().is_empty())
            .ok_or_else(|| {
                GatewayError::NotConfigured("gateway.access_token is not set".to_string())
            })?;

        Ok(Self::new(url, access_token).with_timeouts(
            Duration::from_secs(config.control_timeout_secs),
            Duration::from_secs(config.data_timeout_secs),
        ))
    }

    /// `control` bounds `initialize`; `data` bounds tool listing and calls.
    pub fn with_timeouts(mut self, control: Duration, data: Duration) -> Self {
        self.control_timeout = control;
        self.data_timeout = data;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn initialize(
        &self,
        client_name: &str,
        client_version: &str,
    ) -> Result<InitializeResult, GatewayError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {"name": client_name, "version": client_version},
        });
        let result = self.rpc(METHOD_INITIALIZE, params, self.control_timeout).await?;
        decode_result(result)
    }

    /// Every tool the gateway exposes, following pagination cursors, narrowed
    /// to the names `filter` accepts.
    pub async fn list_tools(
        &self,
        filter: Option<&ToolFilter>,
    ) -> Result<Vec<ToolDescriptor>, GatewayError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let params = match &cursor {
                Some(cursor) => json!({"cursor": cursor}),
                None => json!({}),
            };
            let page: ListToolsResult =
                decode_result(self.rpc(METHOD_LIST_TOOLS, params, self.data_timeout).await?)?;
            tools.extend(page.tools);

            match page.next_cursor.filter(|next| !next.is_empty()) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(match filter {
            Some(filter) => filter.apply(tools),
            None => tools,
        })
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult, GatewayError> {
        let params = json!({"name": name, "arguments": arguments});
        let result: ToolCallResult =
            decode_result(self.rpc(METHOD_CALL_TOOL, params, self.data_timeout).await?)?;
        if result.is_error {
            warn!(
                event_name = "gateway.tool.error_result",
                tool = %name,
                "gateway tool reported an error result"
            );
        }
        Ok(result)
    }

    async fn rpc(&self, method: &str, params: Value, timeout: Duration) -> Result<Value, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        debug!(event_name = "gateway.rpc.request", id, method = %method, "sending gateway request");

        let timeout_error = || GatewayError::Timeout { timeout_secs: timeout.as_secs() };
        let map_request_error = |err: reqwest::Error| {
            if err.is_timeout() {
                timeout_error()
            } else {
                GatewayError::Transport(err.to_string())
            }
        };

        let response = self
            .http
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token.expose_secret()))
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;

        if !status.is_success() {
            warn!(
                event_name = "gateway.rpc.failed",
                id,
                method = %method,
                status = status.as_u16(),
                "gateway returned a non-success status"
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body.trim().chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let envelope = serde_json::from_str::<RpcResponse>(&body)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;

        if let Some(error) = envelope.error {
            warn!(
                event_name = "gateway.rpc.failed",
                id,
                method = %method,
                code = error.code,
                "gateway returned a JSON-RPC error"
            );
            return Err(GatewayError::Rpc { code: error.code, message: error.message });
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

fn decode_result<T: DeserializeOwned + Default>(value: Value) -> Result<T, GatewayError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|err| GatewayError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use concierge_core::config::AppConfig;

    use super::GatewayClient;
    use crate::error::GatewayError;

    #[test]
    fn from_config_requires_url_and_token() {
        let mut config = AppConfig::default().gateway;
        assert!(matches!(
            GatewayClient::from_config(&config),
            Err(GatewayError::NotConfigured(message)) if message.contains("gateway.url")
        ));

        config.url = Some("https://gateway.example.com/mcp".to_string());
        assert!(matches!(
            GatewayClient::from_config(&config),
            Err(GatewayError::NotConfigured(message)) if message.contains("access_token")
        ));

        config.access_token = Some("token".to_string().into());
        let client = GatewayClient::from_config(&config).expect("configured");
        assert_eq!(client.url(), "https://gateway.example.com/mcp");
    }

    #[test]
    fn debug_output_hides_the_token() {
        let client = GatewayClient::new("https://gateway.example.com", "top-secret".to_string().into());
        assert!(!format!("{client:?}").contains("top-secret"));
    }
}
