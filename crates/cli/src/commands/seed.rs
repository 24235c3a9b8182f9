use serde::Serialize;

use shelfwise_core::config::{AppConfig, LoadOptions};
use shelfwise_db::{connect_with_settings, migrations, DemoSeedDataset};

use crate::commands::{build_runtime, CommandResult};

#[derive(Debug, Serialize)]
struct SeedOutput {
    command: &'static str,
    status: &'static str,
    stores: usize,
    items: usize,
    checks: Vec<SeedCheck>,
}

#[derive(Debug, Serialize)]
struct SeedCheck {
    name: &'static str,
    passed: bool,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
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
                "seed",
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

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let summary = DemoSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        let verification = DemoSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        pool.close().await;

        if !verification.all_present {
            let failed = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(("seed_verification", format!("failed checks: {failed}"), 6u8));
        }

        Ok::<SeedOutput, (&'static str, String, u8)>(SeedOutput {
            command: "seed",
            status: "ok",
            stores: summary.stores,
            items: summary.items,
            checks: verification
                .checks
                .into_iter()
                .map(|(name, passed)| SeedCheck { name, passed })
                .collect(),
        })
    });

    match result {
        Ok(output) => CommandResult {
            exit_code: 0,
            output: serde_json::to_string(&output)
                .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}")),
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
