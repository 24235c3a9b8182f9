pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::ask::AskArgs;

#[derive(Debug, Parser)]
#[command(
    name = "shelfwise",
    about = "Shelfwise operator CLI",
    long_about = "Operate the Shelfwise grounded retail assistant: migrations, demo data, \
                  one-shot turns, analytics, and readiness checks.",
    after_help = "Examples:\n  shelfwise migrate\n  shelfwise seed\n  shelfwise ask \"hang a \
                  picture without drilling\" --no-drilling\n  shelfwise stats\n  shelfwise doctor"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the deterministic demo store and catalog, then verify it")]
    Seed,
    #[command(about = "Run one assistant turn against the configured reasoning provider")]
    Ask(AskArgs),
    #[command(about = "Print the analytics overview for a store")]
    Stats {
        #[arg(long, default_value = shelfwise_db::fixtures::DEMO_STORE_ID)]
        store_id: String,
    },
    #[command(about = "Validate config, database connectivity, schema, and provider readiness")]
    Doctor,
    #[command(about = "Inspect effective configuration with secrets redacted")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Ask(args) => commands::ask::run(args),
        Command::Stats { store_id } => commands::stats::run(&store_id),
        Command::Doctor => commands::doctor::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
