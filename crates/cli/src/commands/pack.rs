use concierge_core::PackingListGenerator;
use tracing::info;

use crate::commands::{async_runtime, load_config, product_search, CommandResult};

const COMMAND: &str = "pack";

pub fn run(description: &str, user_id: &str) -> CommandResult {
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

    let generator = PackingListGenerator::new(search);
    let answer = runtime.block_on(generator.generate_packing_list(user_id, description));
    let found = answer.asins.len();
    let total = answer.items.items.len();
    info!(event_name = "cli.pack.completed", found, total, "pack command finished");

    CommandResult::with_data(COMMAND, format!("{found} of {total} items have picks"), answer)
}
