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

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl GeminiProvider {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "llm.api_key is required for the gemini provider".to_string(),
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
        // Gemini has no assistant role; history folds in as user/model turns.
        let mut contents: Vec<Value> = context
            .history
            .iter()
            .map(|message| {
                json!({
                    "role": match message.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    },
                    "parts": [{"text": message.content}],
                })
            })
            .collect();
        contents.push(json!({"role": "user", "parts": [{"text": context.user_prompt()}]}));

        json!({
            "systemInstruction": {"parts": [{"text": SYSTEM_PROMPT}]},
            "contents": contents,
        })
    }

    async fn request_text(&self, body: &Value) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose_secret()
        );
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("gemini returned status {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| ProviderError::Transport(error.to_string()))?;

        payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.pointer("/content/parts/0/text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl ReasoningProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        context: &ReasoningContext,
    ) -> Result<ReasoningOutput, ProviderError> {
        let body = self.request_body(context);

        let mut last_error = ProviderError::EmptyResponse;
        for attempt in 0..=self.max_retries {
            match self.request_text(&body).await {
                Ok(text) => return parse_reasoning_payload(&text),
                Err(error) => {
                    warn!(
                        event_name = "assistant.provider.transport_retry",
                        provider = "gemini",
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

    use super::GeminiProvider;

    #[test]
    fn request_body_uses_model_role_for_assistant_history() {
        let mut config = AppConfig::default().llm;
        config.api_key = Some("test-key".to_string().into());
        config.model = "gemini-1.5-flash".to_string();
        let provider = GeminiProvider::from_config(&config).expect("provider builds");

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
        let contents = body["contents"].as_array().expect("contents array");
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .expect("system text")
            .contains("TRUTH MODE RULES"));
    }
}
