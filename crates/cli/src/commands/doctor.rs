use serde::Serialize;
use sqlx::Row;

use shelfwise_core::config::{AppConfig, LoadOptions};
use shelfwise_db::connect_with_settings;

use crate::commands::{build_runtime, CommandResult};

#[derive(Debug, Serialize)]
struct DoctorReport {
    command: &'static str,
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    passed: bool,
    detail: String,
}

pub fn run() -> CommandResult {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_valid",
                passed: true,
                detail: "configuration loaded and validated".to_string(),
            });
            config
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_valid",
                passed: false,
                detail: error.to_string(),
            });
            return finish(checks);
        }
    };

    checks.push(DoctorCheck {
        name: "provider_key_present",
        passed: config.llm.api_key.is_some(),
        detail: format!("llm.provider = {:?}", config.llm.provider),
    });

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(DoctorCheck {
                name: "runtime_init",
                passed: false,
                detail: error.to_string(),
            });
            return finish(checks);
        }
    };

    runtime.block_on(async {
        match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Err(error) => {
                checks.push(DoctorCheck {
                    name: "db_connectivity",
                    passed: false,
                    detail: error.to_string(),
                });
            }
            Ok(pool) => {
                checks.push(DoctorCheck {
                    name: "db_connectivity",
                    passed: true,
                    detail: config.database.url.clone(),
                });

                let schema = sqlx::query(
                    "SELECT COUNT(*) AS present FROM sqlite_master WHERE type = 'table' \
                     AND name IN ('store', 'inventory_item', 'conversation', 'conversation_log')",
                )
                .fetch_one(&pool)
                .await;
                match schema {
                    Ok(row) => {
                        let present: i64 = row.try_get("present").unwrap_or(0);
                        checks.push(DoctorCheck {
                            name: "schema_migrated",
                            passed: present == 4,
                            detail: format!("{present}/4 managed tables present"),
                        });
                    }
                    Err(error) => {
                        checks.push(DoctorCheck {
                            name: "schema_migrated",
                            passed: false,
                            detail: error.to_string(),
                        });
                    }
                }
                pool.close().await;
            }
        }
    });

    finish(checks)
}

fn finish(checks: Vec<DoctorCheck>) -> CommandResult {
    let all_passed = checks.iter().all(|check| check.passed);
    let report = DoctorReport {
        command: "doctor",
        status: if all_passed { "ok" } else { "degraded" },
        checks,
    };
    CommandResult {
        exit_code: 0,
        output: serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}")),
    }
}
