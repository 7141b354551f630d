use std::sync::Arc;

use concierge_agent::{AgentRuntime, DetachedLlm, SubagentKind, SubagentReply, SubagentRequest};
use tracing::info;

use crate::commands::{async_runtime, load_config, CommandResult};

const COMMAND: &str = "shop";

pub struct ShopArgs<'a> {
    pub query: &'a str,
    pub user_id: Option<&'a str>,
    pub session_id: Option<&'a str>,
    pub subagent: SubagentKind,
}

pub fn run(args: ShopArgs<'_>) -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let agents = match AgentRuntime::from_config(&config, Arc::new(DetachedLlm)) {
        Ok(agents) => agents,
        Err(error) => {
            return CommandResult::failure(COMMAND, error.error_code(), error.to_string(), 2);
        }
    };
    let runtime = match async_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let mut request = SubagentRequest::new(args.query);
    if let Some(user_id) = args.user_id {
        request = request.with_user(user_id);
    }
    if let Some(session_id) = args.session_id {
        request = request.with_session(session_id);
    }

    let reply = runtime.block_on(agents.handle(args.subagent, &request));
    info!(
        event_name = "cli.shop.completed",
        subagent = ?args.subagent,
        is_error = reply.is_error(),
        "shop command finished"
    );

    match reply {
        SubagentReply::Result(_) => CommandResult::with_data(COMMAND, "subagent replied", reply),
        SubagentReply::Error(message) => CommandResult::failure(COMMAND, "subagent_error", message, 1),
    }
}
