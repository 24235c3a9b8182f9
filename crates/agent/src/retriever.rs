use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use shelfwise_core::config::AssistantConfig;
use shelfwise_core::domain::constraints::SearchConstraints;
use shelfwise_core::domain::inventory::InventoryItem;
use shelfwise_core::retrieval::{select_candidates, InventoryQuery};
use shelfwise_db::repositories::InventoryRepository;

use crate::orchestrator::TurnError;

/// Turns an utterance plus constraints into the turn's bounded candidate
/// list: tokenization and synonym expansion, a breadth-capped repository
/// text query, the fixed-order constraint filters, then the result cap.
pub struct CandidateRetriever {
    inventory: Arc<dyn InventoryRepository>,
    max_candidates: usize,
    search_breadth: usize,
    repository_timeout: Duration,
}

impl CandidateRetriever {
    pub fn new(inventory: Arc<dyn InventoryRepository>, config: &AssistantConfig) -> Self {
        Self {
            inventory,
            max_candidates: config.max_candidates,
            search_breadth: config.search_breadth,
            repository_timeout: Duration::from_secs(config.repository_timeout_secs),
        }
    }

    /// An empty result is a valid outcome, not an error; it propagates to the
    /// caller who answers honestly instead of guessing.
    pub async fn retrieve(
        &self,
        store_id: &str,
        utterance: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<InventoryItem>, TurnError> {
        let mut query = InventoryQuery::for_turn(store_id, utterance);
        query.in_stock_only = constraints.in_stock_only;
        query.limit = self.search_breadth;

        let matched = timeout(self.repository_timeout, self.inventory.search(&query))
            .await
            .map_err(|_| TurnError::Timeout("inventory search"))??;

        Ok(select_candidates(matched, constraints, self.max_candidates))
    }
}
