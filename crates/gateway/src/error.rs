use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway is not configured: {0}")]
    NotConfigured(String),
    #[error("gateway request failed: {0}")]
    Transport(String),
    #[error("gateway request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("gateway error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("gateway response could not be decoded: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "gateway_not_configured",
            Self::Transport(_) => "gateway_transport",
            Self::Timeout { .. } => "gateway_timeout",
            Self::Status { .. } => "gateway_http_status",
            Self::Rpc { .. } => "gateway_rpc",
            Self::Decode(_) => "gateway_decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GatewayError;

    #[test]
    fn rpc_errors_render_code_and_message() {
        let error = GatewayError::Rpc { code: -32601, message: "Method not found".to_string() };
        assert_eq!(error.to_string(), "gateway error -32601: Method not found");
        assert_eq!(error.error_code(), "gateway_rpc");
    }
}
