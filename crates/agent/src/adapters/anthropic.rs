use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::warn;

use shelfwise_core::config::LlmConfig;
use shelfwise_core::domain::conversation::MessageRole;
use shelfwise_core::domain::reasoning::ReasoningOutput;
use shelfwise_core::grounding::context::{ReasoningContext, SYSTEM_PROMPT};

use crate::payload::parse_reasoning_payload;
use crate::provider::{ProviderError, ReasoningProvider};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_OUTPUT_TOKENS: u32 = 2048;

pub struct AnthropicProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl AnthropicProvider {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "llm.api_key is required for the anthropic provider".to_string(),
            )
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    fn request_body(&self, context: &ReasoningContext) -> Value {
        let mut messages: Vec<Value> = context
            .history
            .iter()
            .map(|message| {
                json!({
                    "role": match message.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "assistant",
                    },
                    "content": message.content,
                })
            })
            .collect();
        messages.push(json!({"role": "user", "content": context.user_prompt()}));

        json!({
            "model": self.model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": messages,
        })
    }

    async fn request_text(&self, body: &Value) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("anthropic returned status {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        payload
            .get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            })
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl ReasoningProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(
        &self,
        context: &ReasoningContext,
    ) -> Result<ReasoningOutput, ProviderError> {
        let body = self.request_body(context);

        // Transport failures are retried here, in the adapter; a payload that
        // arrives but fails the single-JSON-object contract is not.
        let mut last_error = ProviderError::EmptyResponse;
        for attempt in 0..=self.max_retries {
            match self.request_text(&body).await {
                Ok(text) => return parse_reasoning_payload(&text),
                Err(error) => {
                    warn!(
                        event_name = "assistant.provider.transport_retry",
                        provider = "anthropic",
                        attempt,
                        error = %error,
                        "reasoning request failed"
                    );
                    last_error = error;
                }
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use shelfwise_core::config::AppConfig;
    use shelfwise_core::domain::constraints::SearchConstraints;
    use shelfwise_core::domain::policy::StorePolicy;
    use shelfwise_core::grounding::context::assemble;

    use super::AnthropicProvider;

    #[test]
    fn request_body_folds_history_before_current_prompt() {
        let mut config = AppConfig::default().llm;
        config.api_key = Some("test-key".to_string().into());
        let provider = AnthropicProvider::from_config(&config).expect("provider builds");

        let mut context = assemble(
            "hang a picture",
            &[],
            Vec::new(),
            StorePolicy::default(),
            SearchConstraints::default(),
        );
        let mut conversation =
            shelfwise_core::domain::conversation::Conversation::new("store-1", "user-1");
        conversation.push_turn("earlier question", "earlier answer", &[]);
        context.history = conversation.messages;

        let body = provider.request_body(&context);
        let messages = body["messages"].as_array().expect("messages array");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        let last = messages[2]["content"].as_str().expect("prompt text");
        assert!(last.contains("CUSTOMER QUESTION"));
        assert!(body["system"].as_str().expect("system prompt").contains("TRUTH MODE RULES"));
    }
}
