use concierge_core::SearchOrchestrator;
use tracing::info;

use crate::commands::{async_runtime, load_config, product_search, CommandResult};

const COMMAND: &str = "search";

pub fn run(question: &str, user_id: &str) -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let search = match product_search(COMMAND, &config) {
        Ok(search) => search,
        Err(result) => return result,
    };
    let runtime = match async_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let orchestrator = SearchOrchestrator::new(search);
    let list = runtime.block_on(orchestrator.search_products(user_id, question));
    info!(event_name = "cli.search.completed", found = list.asins.len(), "search command finished");

    let message = format!("{} products found", list.asins.len());
    CommandResult::with_data(COMMAND, message, list)
}
