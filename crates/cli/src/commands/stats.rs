use shelfwise_core::config::{AppConfig, LoadOptions};
use shelfwise_db::connect_with_settings;
use shelfwise_db::repositories::{AnalyticsSink, SqlAnalyticsSink};

use crate::commands::{build_runtime, CommandResult};

pub fn run(store_id: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "stats",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "stats",
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

        let overview = SqlAnalyticsSink::new(pool.clone())
            .overview(store_id)
            .await
            .map_err(|error| ("analytics_query", error.to_string(), 5u8))?;
        pool.close().await;

        serde_json::to_string_pretty(&overview)
            .map_err(|error| ("serialization", error.to_string(), 5u8))
    });

    match result {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("stats", error_class, message, exit_code)
        }
    }
}
