use serde::{Deserialize, Serialize};

use crate::local_tools::ANONYMOUS_USER;

/// One request routed to a subagent by the orchestrating agent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubagentRequest {
    pub query: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl SubagentRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Blank or missing ids fall back to `anonymous`.
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty()).unwrap_or(ANONYMOUS_USER)
    }

    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or_default()
    }
}

/// What a subagent hands back to its caller: `{"result": ...}` or
/// `{"error": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubagentReply {
    Result(String),
    Error(String),
}

impl SubagentReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Result(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{SubagentReply, SubagentRequest};

    #[test]
    fn blank_user_id_falls_back_to_anonymous() {
        assert_eq!(SubagentRequest::new("tent").user_id(), "anonymous");
        assert_eq!(SubagentRequest::new("tent").with_user("  ").user_id(), "anonymous");
        assert_eq!(SubagentRequest::new("tent").with_user("u-1").user_id(), "u-1");
        assert_eq!(SubagentRequest::new("tent").session_id(), "");
    }

    #[test]
    fn replies_serialize_as_single_key_objects() {
        let ok = serde_json::to_value(SubagentReply::Result("done".to_string())).expect("serialize");
        let err = serde_json::to_value(SubagentReply::Error("boom".to_string())).expect("serialize");

        assert_eq!(ok, json!({"result": "done"}));
        assert_eq!(err, json!({"error": "boom"}));
        assert!(SubagentReply::Error("boom".to_string()).is_error());
    }
}
