use serde::Serialize;

use shelfwise_core::config::{AppConfig, LoadOptions};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    database: DatabaseView,
    llm: LlmView,
    assistant: AssistantView,
    logging: LoggingView,
}

#[derive(Debug, Serialize)]
struct DatabaseView {
    url: String,
    max_connections: u32,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct LlmView {
    provider: String,
    model: String,
    api_key: &'static str,
    base_url: Option<String>,
    timeout_secs: u64,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct AssistantView {
    max_candidates: usize,
    search_breadth: usize,
    repository_timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct LoggingView {
    level: String,
    format: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let view = EffectiveConfig {
        database: DatabaseView {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            timeout_secs: config.database.timeout_secs,
        },
        llm: LlmView {
            provider: format!("{:?}", config.llm.provider).to_lowercase(),
            model: config.llm.model.clone(),
            api_key: if config.llm.api_key.is_some() { "[redacted]" } else { "[unset]" },
            base_url: config.llm.base_url.clone(),
            timeout_secs: config.llm.timeout_secs,
            max_retries: config.llm.max_retries,
        },
        assistant: AssistantView {
            max_candidates: config.assistant.max_candidates,
            search_breadth: config.assistant.search_breadth,
            repository_timeout_secs: config.assistant.repository_timeout_secs,
        },
        logging: LoggingView {
            level: config.logging.level.clone(),
            format: format!("{:?}", config.logging.format).to_lowercase(),
        },
    };

    CommandResult {
        exit_code: 0,
        output: serde_json::to_string_pretty(&view)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}")),
    }
}
