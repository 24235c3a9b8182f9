use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use shelfwise_core::domain::turn::TurnLog;

use super::{AnalyticsOverview, AnalyticsSink, IntentCount, RepositoryError, SkuCount};
use crate::DbPool;

pub struct SqlAnalyticsSink {
    pool: DbPool,
}

impl SqlAnalyticsSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for SqlAnalyticsSink {
    async fn record_turn(&self, log: TurnLog) -> Result<(), RepositoryError> {
        let skus_payload = serde_json::to_string(&log.recommended_skus)
            .map_err(|error| RepositoryError::Decode(format!("encode skus: {error}")))?;
        let constraints_payload = serde_json::to_string(&log.constraints)
            .map_err(|error| RepositoryError::Decode(format!("encode constraints: {error}")))?;

        sqlx::query(
            "INSERT INTO conversation_log (id, conversation_id, store_id, user_id, user_message, \
             assistant_message, recommended_skus, latency_ms, intent, constraints, error, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&log.conversation_id)
        .bind(&log.store_id)
        .bind(&log.user_id)
        .bind(&log.user_message)
        .bind(&log.assistant_message)
        .bind(skus_payload)
        .bind(log.latency_ms as i64)
        .bind(&log.intent)
        .bind(constraints_payload)
        .bind(&log.error)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn overview(&self, store_id: &str) -> Result<AnalyticsOverview, RepositoryError> {
        let (total_conversations,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversation WHERE store_id = ?")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        let (total_turns, average_latency_ms): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), CAST(COALESCE(AVG(latency_ms), 0) AS REAL) FROM conversation_log \
             WHERE store_id = ?",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        let intent_rows = sqlx::query(
            "SELECT intent, COUNT(*) AS turn_count FROM conversation_log WHERE store_id = ? \
             GROUP BY intent ORDER BY turn_count DESC, intent ASC LIMIT 5",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        let top_intents = intent_rows
            .iter()
            .map(|row| {
                Ok(IntentCount { intent: row.try_get("intent")?, count: row.try_get("turn_count")? })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let sku_rows = sqlx::query(
            "SELECT json_each.value AS sku, COUNT(*) AS hit_count FROM conversation_log, \
             json_each(conversation_log.recommended_skus) WHERE conversation_log.store_id = ? \
             GROUP BY json_each.value ORDER BY hit_count DESC, sku ASC LIMIT 5",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        let top_recommended_skus = sku_rows
            .iter()
            .map(|row| Ok(SkuCount { sku: row.try_get("sku")?, count: row.try_get("hit_count")? }))
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(AnalyticsOverview {
            total_conversations,
            total_turns,
            average_latency_ms,
            top_intents,
            top_recommended_skus,
        })
    }
}
