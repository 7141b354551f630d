pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use concierge_agent::SubagentKind;
use std::process::ExitCode;

use crate::commands::shop::ShopArgs;

const DEFAULT_USER: &str = "anonymous";

#[derive(Debug, Parser)]
#[command(
    name = "concierge",
    about = "Concierge shopping operator CLI",
    long_about = "Run product searches, packing lists and subagent requests, and inspect configuration and readiness.",
    after_help = "Examples:\n  concierge search \"hiking boots under $120\"\n  concierge pack \"beach vacation for a week\"\n  concierge shop \"find a water bottle\" --user u-1\n  concierge doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SubagentArg {
    Shopping,
    Cart,
}

impl From<SubagentArg> for SubagentKind {
    fn from(value: SubagentArg) -> Self {
        match value {
            SubagentArg::Shopping => Self::Shopping,
            SubagentArg::Cart => Self::Cart,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Search products for a free-text question and print the ranked product list")]
    Search {
        question: String,
        #[arg(long, default_value = DEFAULT_USER, help = "User id recorded with the search")]
        user: String,
    },
    #[command(about = "Build a packing list with product picks for a trip description")]
    Pack {
        description: String,
        #[arg(long, default_value = DEFAULT_USER, help = "User id recorded with the list")]
        user: String,
    },
    #[command(about = "Send a request to the shopping or cart subagent through the gateway")]
    Shop {
        query: String,
        #[arg(long, help = "User id forwarded to the subagent")]
        user: Option<String>,
        #[arg(long, help = "Session id forwarded to the subagent")]
        session: Option<String>,
        #[arg(long, value_enum, default_value_t = SubagentArg::Shopping)]
        subagent: SubagentArg,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, search API key presence, and gateway reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init_from_config();

    let result = match cli.command {
        Command::Search { question, user } => commands::search::run(&question, &user),
        Command::Pack { description, user } => commands::pack::run(&description, &user),
        Command::Shop { query, user, session, subagent } => commands::shop::run(ShopArgs {
            query: &query,
            user_id: user.as_deref(),
            session_id: session.as_deref(),
            subagent: subagent.into(),
        }),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
