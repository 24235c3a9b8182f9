use std::collections::HashMap;

use tokio::sync::RwLock;

use shelfwise_core::domain::conversation::{Conversation, ConversationId};
use shelfwise_core::domain::inventory::InventoryItem;
use shelfwise_core::domain::policy::StorePolicy;
use shelfwise_core::domain::turn::TurnLog;
use shelfwise_core::retrieval::InventoryQuery;

use super::{
    AnalyticsOverview, AnalyticsSink, ConversationStore, IntentCount, InventoryRepository,
    RepositoryError, SkuCount, StoreRepository,
};

/// In-memory catalog with the same matching and ordering semantics as the
/// SQL implementation.
#[derive(Default)]
pub struct InMemoryInventoryRepository {
    items: RwLock<Vec<InventoryItem>>,
}

impl InMemoryInventoryRepository {
    pub fn with_items(items: Vec<InventoryItem>) -> Self {
        Self { items: RwLock::new(items) }
    }

    pub async fn upsert(&self, item: InventoryItem) {
        let mut items = self.items.write().await;
        if let Some(existing) = items
            .iter_mut()
            .find(|candidate| candidate.store_id == item.store_id && candidate.sku == item.sku)
        {
            *existing = item;
        } else {
            items.push(item);
        }
    }
}

fn matches_terms(item: &InventoryItem, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let name = item.name.to_lowercase();
    let description = item.description.to_lowercase();
    let category = item.category.to_lowercase();
    terms.iter().any(|term| {
        let needle = term.to_lowercase();
        name.contains(&needle)
            || description.contains(&needle)
            || category.contains(&needle)
            || item.tags.iter().any(|tag| tag.eq_ignore_ascii_case(&needle))
    })
}

#[async_trait::async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn search(&self, query: &InventoryQuery) -> Result<Vec<InventoryItem>, RepositoryError> {
        let items = self.items.read().await;
        let mut matched: Vec<InventoryItem> = items
            .iter()
            .filter(|item| item.store_id == query.store_id)
            .filter(|item| !query.in_stock_only || item.stock > 0)
            .filter(|item| matches_terms(item, &query.terms))
            .cloned()
            .collect();
        matched.sort_by(|left, right| {
            right.stock.cmp(&left.stock).then_with(|| left.name.cmp(&right.name))
        });
        matched.truncate(query.limit);
        Ok(matched)
    }

    async fn find_by_sku(
        &self,
        store_id: &str,
        sku: &str,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.store_id == store_id && item.sku == sku).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryStoreRepository {
    policies: RwLock<HashMap<String, StorePolicy>>,
}

impl InMemoryStoreRepository {
    pub async fn set_policy(&self, store_id: &str, policy: StorePolicy) {
        self.policies.write().await.insert(store_id.to_string(), policy);
    }
}

#[async_trait::async_trait]
impl StoreRepository for InMemoryStoreRepository {
    async fn find_policy(&self, store_id: &str) -> Result<Option<StorePolicy>, RepositoryError> {
        Ok(self.policies.read().await.get(store_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub async fn find(&self, id: &ConversationId) -> Option<Conversation> {
        self.conversations.read().await.get(&id.0).cloned()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_or_create(
        &self,
        id: Option<&ConversationId>,
        store_id: &str,
        user_id: &str,
    ) -> Result<Conversation, RepositoryError> {
        let mut conversations = self.conversations.write().await;
        if let Some(id) = id {
            if let Some(existing) = conversations.get(&id.0) {
                return Ok(existing.clone());
            }
        }
        let conversation = Conversation::new(store_id, user_id);
        conversations.insert(conversation.id.0.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn append_turn(
        &self,
        id: &ConversationId,
        user_message: &str,
        assistant_message: &str,
        new_skus: &[String],
    ) -> Result<(), RepositoryError> {
        let mut conversations = self.conversations.write().await;
        let Some(conversation) = conversations.get_mut(&id.0) else {
            return Err(RepositoryError::Decode(format!("conversation `{}` not found", id.0)));
        };
        conversation.push_turn(user_message, assistant_message, new_skus);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAnalyticsSink {
    logs: RwLock<Vec<TurnLog>>,
}

impl InMemoryAnalyticsSink {
    pub async fn logs(&self) -> Vec<TurnLog> {
        self.logs.read().await.clone()
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for InMemoryAnalyticsSink {
    async fn record_turn(&self, log: TurnLog) -> Result<(), RepositoryError> {
        self.logs.write().await.push(log);
        Ok(())
    }

    async fn overview(&self, store_id: &str) -> Result<AnalyticsOverview, RepositoryError> {
        let logs = self.logs.read().await;
        let store_logs: Vec<&TurnLog> =
            logs.iter().filter(|log| log.store_id == store_id).collect();

        let total_turns = store_logs.len() as i64;
        let average_latency_ms = if store_logs.is_empty() {
            0.0
        } else {
            store_logs.iter().map(|log| log.latency_ms as f64).sum::<f64>()
                / store_logs.len() as f64
        };

        let mut intent_counts: HashMap<String, i64> = HashMap::new();
        let mut sku_counts: HashMap<String, i64> = HashMap::new();
        for log in &store_logs {
            *intent_counts.entry(log.intent.clone()).or_default() += 1;
            for sku in &log.recommended_skus {
                *sku_counts.entry(sku.clone()).or_default() += 1;
            }
        }

        Ok(AnalyticsOverview {
            total_conversations: 0,
            total_turns,
            average_latency_ms,
            top_intents: top_counts(intent_counts)
                .into_iter()
                .map(|(intent, count)| IntentCount { intent, count })
                .collect(),
            top_recommended_skus: top_counts(sku_counts)
                .into_iter()
                .map(|(sku, count)| SkuCount { sku, count })
                .collect(),
        })
    }
}

fn top_counts(counts: HashMap<String, i64>) -> Vec<(String, i64)> {
    let mut entries: Vec<(String, i64)> = counts.into_iter().collect();
    entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
    entries.truncate(5);
    entries
}
