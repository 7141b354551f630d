use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("search request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("search provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("search provider error: {0}")]
    Provider(String),
    #[error("search response could not be decoded: {0}")]
    Decode(String),
    #[error("search provider is not configured: {0}")]
    Configuration(String),
}

impl ProviderError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "http_status",
            Self::Provider(_) => "provider",
            Self::Decode(_) => "decode",
            Self::Configuration(_) => "configuration",
        }
    }
}
