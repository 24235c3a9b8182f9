use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use shelfwise_core::domain::conversation::{Conversation, ConversationId};
use shelfwise_core::domain::inventory::InventoryItem;
use shelfwise_core::domain::policy::StorePolicy;
use shelfwise_core::domain::turn::TurnLog;
use shelfwise_core::retrieval::InventoryQuery;

pub mod analytics;
pub mod conversation;
pub mod inventory;
pub mod memory;
pub mod store;

pub use analytics::SqlAnalyticsSink;
pub use conversation::SqlConversationStore;
pub use inventory::SqlInventoryRepository;
pub use memory::{
    InMemoryAnalyticsSink, InMemoryConversationStore, InMemoryInventoryRepository,
    InMemoryStoreRepository,
};
pub use store::SqlStoreRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read access to a store's catalog. `search` applies the text query,
/// store/stock scoping, ordering (stock descending, name ascending) and the
/// breadth cap; constraint filtering happens in the caller.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn search(&self, query: &InventoryQuery) -> Result<Vec<InventoryItem>, RepositoryError>;
    async fn find_by_sku(
        &self,
        store_id: &str,
        sku: &str,
    ) -> Result<Option<InventoryItem>, RepositoryError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// `None` means the store is unknown; an existing store with an empty
    /// policy object yields the defaults.
    async fn find_policy(&self, store_id: &str) -> Result<Option<StorePolicy>, RepositoryError>;
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Resolves by id when given and known; otherwise creates (and persists)
    /// a fresh conversation.
    async fn get_or_create(
        &self,
        id: Option<&ConversationId>,
        store_id: &str,
        user_id: &str,
    ) -> Result<Conversation, RepositoryError>;

    /// Appends one user/assistant exchange and unions newly recommended SKUs.
    /// Implementations must re-read the latest persisted record before
    /// writing so concurrent turns append rather than overwrite.
    async fn append_turn(
        &self,
        id: &ConversationId,
        user_message: &str,
        assistant_message: &str,
        new_skus: &[String],
    ) -> Result<(), RepositoryError>;
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AnalyticsOverview {
    pub total_conversations: i64,
    pub total_turns: i64,
    pub average_latency_ms: f64,
    pub top_intents: Vec<IntentCount>,
    pub top_recommended_skus: Vec<SkuCount>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IntentCount {
    pub intent: String,
    pub count: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SkuCount {
    pub sku: String,
    pub count: i64,
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record_turn(&self, log: TurnLog) -> Result<(), RepositoryError>;
    async fn overview(&self, store_id: &str) -> Result<AnalyticsOverview, RepositoryError>;
}
