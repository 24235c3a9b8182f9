use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use shelfwise_core::config::AppConfig;
use shelfwise_core::domain::conversation::ConversationId;
use shelfwise_core::domain::inventory::InventoryItem;
use shelfwise_core::domain::reasoning::{CartRequest, ReasoningOutput};
use shelfwise_core::domain::turn::{
    CartLine, ProductCard, TurnLog, TurnMetadata, TurnRequest, TurnResponse,
};
use shelfwise_core::grounding::{context, intent, safety, validator};
use shelfwise_core::grounding::fallback::{safe_fallback, FallbackReason};
use shelfwise_db::repositories::{
    AnalyticsSink, ConversationStore, InventoryRepository, RepositoryError, StoreRepository,
};

use crate::provider::ReasoningProvider;
use crate::retriever::CandidateRetriever;
use crate::transcription::TranscriptionProvider;

/// Pipeline position for one turn. Progression is strictly forward;
/// `Failed` is terminal and reachable from any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    Retrieving,
    ContextBuilt,
    Reasoning,
    Validating,
    Annotating,
    Persisting,
    Done,
    Failed,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieving => "retrieving",
            Self::ContextBuilt => "context_built",
            Self::Reasoning => "reasoning",
            Self::Validating => "validating",
            Self::Annotating => "annotating",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Internal-only failure; never escapes `handle_turn`.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),
    #[error("timed out during {0}")]
    Timeout(&'static str),
    #[error("transcription failure: {0}")]
    Transcription(String),
}

#[derive(Clone, Copy, Debug)]
pub struct TurnSettings {
    pub provider_timeout: Duration,
    pub repository_timeout: Duration,
}

impl TurnSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider_timeout: Duration::from_secs(config.llm.timeout_secs),
            repository_timeout: Duration::from_secs(config.assistant.repository_timeout_secs),
        }
    }
}

/// Sequences one turn end to end: retrieval, context assembly, reasoning,
/// Truth-Mode validation, safety annotation, persistence, analytics.
///
/// The user-visible contract never throws: every failure mode collapses to a
/// fixed safe fallback with confidence 0, and turns are stateless apart from
/// the conversation record updated at the end.
pub struct TurnOrchestrator {
    retriever: CandidateRetriever,
    stores: Arc<dyn StoreRepository>,
    conversations: Arc<dyn ConversationStore>,
    analytics: Arc<dyn AnalyticsSink>,
    provider: Arc<dyn ReasoningProvider>,
    transcription: Arc<dyn TranscriptionProvider>,
    settings: TurnSettings,
}

impl TurnOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        stores: Arc<dyn StoreRepository>,
        conversations: Arc<dyn ConversationStore>,
        analytics: Arc<dyn AnalyticsSink>,
        provider: Arc<dyn ReasoningProvider>,
        transcription: Arc<dyn TranscriptionProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            retriever: CandidateRetriever::new(inventory, &config.assistant),
            stores,
            conversations,
            analytics,
            provider,
            transcription,
            settings: TurnSettings::from_config(config),
        }
    }

    /// One text turn. Always returns a well-formed response.
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
        let started = Instant::now();
        match self.run_pipeline(&request, started).await {
            Ok(response) => response,
            Err(turn_error) => self.failed_turn(&request, started, turn_error).await,
        }
    }

    /// One voice turn: transcribe, then run the ordinary text pipeline. The
    /// response carries the transcript so callers can display what was heard.
    pub async fn handle_voice_turn(
        &self,
        audio: &[u8],
        mime_type: &str,
        request: TurnRequest,
    ) -> TurnResponse {
        let started = Instant::now();
        let transcription =
            match timeout(self.settings.provider_timeout, self.transcription.transcribe(audio, mime_type))
                .await
            {
                Ok(Ok(transcription)) => transcription,
                Ok(Err(provider_error)) => {
                    return self
                        .failed_turn(
                            &request,
                            started,
                            TurnError::Transcription(provider_error.to_string()),
                        )
                        .await;
                }
                Err(_) => {
                    return self
                        .failed_turn(&request, started, TurnError::Timeout("transcription"))
                        .await;
                }
            };

        let text_request = TurnRequest { transcript: transcription.text.clone(), ..request };
        let mut response = self.handle_turn(text_request).await;
        response.transcript = Some(transcription.text);
        response
    }

    async fn run_pipeline(
        &self,
        request: &TurnRequest,
        started: Instant,
    ) -> Result<TurnResponse, TurnError> {
        let requested_id = request.conversation_id.clone().map(ConversationId);
        let conversation = timeout(
            self.settings.repository_timeout,
            self.conversations.get_or_create(
                requested_id.as_ref(),
                &request.store_id,
                &request.user_id,
            ),
        )
        .await
        .map_err(|_| TurnError::Timeout("conversation lookup"))??;
        let conversation_id = conversation.id.0.clone();

        let policy = timeout(
            self.settings.repository_timeout,
            self.stores.find_policy(&request.store_id),
        )
        .await
        .map_err(|_| TurnError::Timeout("store policy lookup"))??
        .unwrap_or_default();

        // Merge is one-directional: policy defaults fill gaps, an explicit
        // request constraint is never overridden.
        let constraints =
            request.constraints.clone().unwrap_or_default().merged_with_policy(&policy);

        self.trace_state(TurnState::Retrieving, &conversation_id);
        let candidates = self
            .retriever
            .retrieve(&request.store_id, &request.transcript, &constraints)
            .await?;

        let reasoning_context = context::assemble(
            &request.transcript,
            &conversation.messages,
            candidates,
            policy.clone(),
            constraints.clone(),
        );
        self.trace_state(TurnState::ContextBuilt, &conversation_id);

        let mut output = if reasoning_context.allowed.is_empty() {
            info!(
                event_name = "assistant.turn.no_inventory",
                conversation_id = %conversation_id,
                store_id = %request.store_id,
                "retrieval produced no candidates; provider skipped"
            );
            safe_fallback(FallbackReason::NoInventory)
        } else {
            self.trace_state(TurnState::Reasoning, &conversation_id);
            let generated = timeout(
                self.settings.provider_timeout,
                self.provider.generate(&reasoning_context),
            )
            .await;

            match generated {
                Err(_) => {
                    warn!(
                        event_name = "assistant.turn.provider_timeout",
                        conversation_id = %conversation_id,
                        provider = self.provider.name(),
                        "reasoning provider timed out"
                    );
                    safe_fallback(FallbackReason::ProviderUnavailable)
                }
                Ok(Err(provider_error)) => {
                    warn!(
                        event_name = "assistant.turn.provider_failed",
                        conversation_id = %conversation_id,
                        provider = self.provider.name(),
                        error = %provider_error,
                        "reasoning provider failed"
                    );
                    safe_fallback(FallbackReason::ProviderUnavailable)
                }
                Ok(Ok(untrusted)) => {
                    self.trace_state(TurnState::Validating, &conversation_id);
                    let validation = validator::validate(untrusted, &reasoning_context.allowed);
                    if validation.is_valid {
                        validation.output
                    } else {
                        warn!(
                            event_name = "assistant.turn.truth_violation",
                            conversation_id = %conversation_id,
                            invalid_skus = ?validation.invalid_skus,
                            "provider referenced out-of-catalog SKUs"
                        );
                        if validation.output.recommended_skus.is_empty()
                            && validation.output.add_on_skus.is_empty()
                        {
                            safe_fallback(FallbackReason::ValidationFailed)
                        } else {
                            validation.output
                        }
                    }
                }
            }
        };

        self.trace_state(TurnState::Annotating, &conversation_id);
        let mut disclaimer = safety::safety_notes(&request.transcript, &policy);
        output.safety_notes.append(&mut disclaimer);

        let recommended_items = hydrate_product_cards(
            &output.recommended_skus,
            &reasoning_context.candidate_items,
            &output.reasoning,
        );
        let add_on_items = hydrate_product_cards(
            &output.add_on_skus,
            &reasoning_context.candidate_items,
            &output.reasoning,
        );
        let cart_suggestion = hydrate_cart(&output.cart, &reasoning_context.candidate_items);

        self.trace_state(TurnState::Persisting, &conversation_id);
        let mut new_skus = output.recommended_skus.clone();
        new_skus.extend(output.add_on_skus.iter().cloned());
        timeout(
            self.settings.repository_timeout,
            self.conversations.append_turn(
                &conversation.id,
                &request.transcript,
                &output.assistant_message,
                &new_skus,
            ),
        )
        .await
        .map_err(|_| TurnError::Timeout("conversation update"))??;

        let latency_ms = started.elapsed().as_millis() as u64;
        let turn_log = TurnLog {
            conversation_id: Some(conversation_id.clone()),
            store_id: request.store_id.clone(),
            user_id: request.user_id.clone(),
            user_message: request.transcript.clone(),
            assistant_message: output.assistant_message.clone(),
            recommended_skus: output.recommended_skus.clone(),
            latency_ms,
            intent: intent::classify(&request.transcript).as_str().to_string(),
            constraints: constraints.clone(),
            error: None,
        };
        timeout(self.settings.repository_timeout, self.analytics.record_turn(turn_log))
            .await
            .map_err(|_| TurnError::Timeout("analytics write"))??;

        self.trace_state(TurnState::Done, &conversation_id);
        info!(
            event_name = "assistant.turn.done",
            conversation_id = %conversation_id,
            latency_ms,
            items_considered = reasoning_context.candidate_items.len(),
            confidence = output.confidence,
            "turn completed"
        );

        Ok(TurnResponse {
            conversation_id: Some(conversation_id),
            transcript: None,
            assistant_message: output.assistant_message,
            follow_up_questions: output.follow_up_questions,
            recommended_items,
            add_on_items,
            cart_suggestion,
            safety_notes: output.safety_notes,
            confidence: output.confidence,
            metadata: TurnMetadata {
                processing_time_ms: latency_ms,
                inventory_searched: true,
                items_considered: reasoning_context.candidate_items.len(),
                error: None,
            },
        })
    }

    /// Terminal failure path: fixed system-error fallback plus an
    /// error-tagged analytics record. Never propagates.
    async fn failed_turn(
        &self,
        request: &TurnRequest,
        started: Instant,
        turn_error: TurnError,
    ) -> TurnResponse {
        error!(
            event_name = "assistant.turn.failed",
            state = TurnState::Failed.as_str(),
            store_id = %request.store_id,
            error = %turn_error,
            "turn aborted; returning system_error fallback"
        );

        let output: ReasoningOutput = safe_fallback(FallbackReason::SystemError);
        let latency_ms = started.elapsed().as_millis() as u64;
        let constraints = request.constraints.clone().unwrap_or_default();

        let turn_log = TurnLog {
            conversation_id: request.conversation_id.clone(),
            store_id: request.store_id.clone(),
            user_id: request.user_id.clone(),
            user_message: request.transcript.clone(),
            assistant_message: output.assistant_message.clone(),
            recommended_skus: Vec::new(),
            latency_ms,
            intent: intent::classify(&request.transcript).as_str().to_string(),
            constraints,
            error: Some(turn_error.to_string()),
        };
        if let Err(log_error) = self.analytics.record_turn(turn_log).await {
            warn!(
                event_name = "assistant.turn.log_write_failed",
                error = %log_error,
                "failed to record error-tagged turn log"
            );
        }

        TurnResponse {
            conversation_id: request.conversation_id.clone(),
            transcript: None,
            assistant_message: output.assistant_message,
            follow_up_questions: Vec::new(),
            recommended_items: Vec::new(),
            add_on_items: Vec::new(),
            cart_suggestion: Vec::new(),
            safety_notes: Vec::new(),
            confidence: 0.0,
            metadata: TurnMetadata {
                processing_time_ms: latency_ms,
                inventory_searched: false,
                items_considered: 0,
                error: Some(turn_error.to_string()),
            },
        }
    }

    fn trace_state(&self, state: TurnState, conversation_id: &str) {
        debug!(
            event_name = "assistant.turn.state",
            state = state.as_str(),
            conversation_id,
            "turn state advanced"
        );
    }
}

/// Validation guarantees membership, so a lookup miss here should be
/// unreachable; a miss is dropped silently rather than surfaced as a hole in
/// the response.
fn hydrate_product_cards(
    skus: &[String],
    inventory: &[InventoryItem],
    reasoning: &BTreeMap<String, String>,
) -> Vec<ProductCard> {
    skus.iter()
        .filter_map(|sku| {
            let item = inventory.iter().find(|candidate| candidate.sku == *sku)?;
            Some(ProductCard {
                sku: item.sku.clone(),
                name: item.name.clone(),
                price: item.price,
                stock: item.stock,
                location: item.location_label(),
                why_it_works: reasoning
                    .get(sku)
                    .cloned()
                    .unwrap_or_else(|| item.description.clone()),
                attributes: item.attributes.clone(),
            })
        })
        .collect()
}

fn hydrate_cart(cart: &[CartRequest], inventory: &[InventoryItem]) -> Vec<CartLine> {
    cart.iter()
        .filter_map(|line| {
            let item = inventory.iter().find(|candidate| candidate.sku == line.sku)?;
            Some(CartLine {
                sku: item.sku.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity: line.qty,
                location: item.location_label(),
            })
        })
        .collect()
}
