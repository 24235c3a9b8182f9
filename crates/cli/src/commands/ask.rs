use std::sync::Arc;

use clap::Args;
use rust_decimal::Decimal;

use shelfwise_agent::{build_provider, DisabledTranscription, TurnOrchestrator};
use shelfwise_core::config::{AppConfig, LoadOptions, LogFormat};
use shelfwise_core::domain::constraints::SearchConstraints;
use shelfwise_core::domain::turn::TurnRequest;
use shelfwise_db::connect_with_settings;
use shelfwise_db::fixtures::DEMO_STORE_ID;
use shelfwise_db::repositories::{
    SqlAnalyticsSink, SqlConversationStore, SqlInventoryRepository, SqlStoreRepository,
};

use crate::commands::{build_runtime, CommandResult};

#[derive(Debug, Args)]
pub struct AskArgs {
    /// The customer question, verbatim.
    pub transcript: String,
    #[arg(long, default_value = DEMO_STORE_ID)]
    pub store_id: String,
    #[arg(long, default_value = "cli-operator")]
    pub user_id: String,
    #[arg(long)]
    pub conversation_id: Option<String>,
    #[arg(long)]
    pub no_damage: bool,
    #[arg(long)]
    pub no_tools: bool,
    #[arg(long)]
    pub no_drilling: bool,
    #[arg(long)]
    pub min_weight: Option<f64>,
    #[arg(long)]
    pub max_weight: Option<f64>,
    #[arg(long)]
    pub max_budget: Option<Decimal>,
    #[arg(long)]
    pub surface_type: Option<String>,
}

impl AskArgs {
    /// Flags map to a constraints object only when at least one is set, so a
    /// bare `ask` runs an unconstrained turn.
    fn to_constraints(&self) -> Option<SearchConstraints> {
        let any_set = self.no_damage
            || self.no_tools
            || self.no_drilling
            || self.min_weight.is_some()
            || self.max_weight.is_some()
            || self.max_budget.is_some()
            || self.surface_type.is_some();
        if !any_set {
            return None;
        }
        Some(SearchConstraints {
            no_damage: self.no_damage.then_some(true),
            no_tools: self.no_tools.then_some(true),
            no_drilling: self.no_drilling.then_some(true),
            min_weight: self.min_weight,
            max_weight: self.max_weight,
            max_budget: self.max_budget,
            surface_type: self.surface_type.clone(),
            ..SearchConstraints::default()
        })
    }
}

fn init_logging(config: &AppConfig) {
    let log_level =
        config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);
    // Init fails only when a subscriber is already set; that is fine here.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run(args: AskArgs) -> CommandResult {
    if args.transcript.trim().is_empty() {
        return CommandResult::failure("ask", "bad_request", "transcript must not be empty", 2);
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config);

    let provider = match build_provider(&config.llm) {
        Ok(provider) => provider,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "provider_configuration",
                format!("reasoning provider unavailable: {error}"),
                2,
            );
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let orchestrator = TurnOrchestrator::new(
            Arc::new(SqlInventoryRepository::new(pool.clone())),
            Arc::new(SqlStoreRepository::new(pool.clone())),
            Arc::new(SqlConversationStore::new(pool.clone())),
            Arc::new(SqlAnalyticsSink::new(pool.clone())),
            provider,
            Arc::new(DisabledTranscription),
            &config,
        );

        let response = orchestrator
            .handle_turn(TurnRequest {
                store_id: args.store_id.clone(),
                user_id: args.user_id.clone(),
                transcript: args.transcript.clone(),
                conversation_id: args.conversation_id.clone(),
                constraints: args.to_constraints(),
            })
            .await;
        pool.close().await;

        serde_json::to_string_pretty(&response)
            .map_err(|error| ("serialization", error.to_string(), 5u8))
    });

    match result {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("ask", error_class, message, exit_code)
        }
    }
}
