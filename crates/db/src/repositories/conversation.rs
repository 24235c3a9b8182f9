use chrono::Utc;
use sqlx::Row;

use shelfwise_core::domain::conversation::{
    Conversation, ConversationId, ConversationMessage, MessageRole,
};

use super::{ConversationStore, RepositoryError};
use crate::repositories::inventory::parse_timestamp;
use crate::DbPool;

pub struct SqlConversationStore {
    pool: DbPool,
}

impl SqlConversationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationStore for SqlConversationStore {
    async fn get_or_create(
        &self,
        id: Option<&ConversationId>,
        store_id: &str,
        user_id: &str,
    ) -> Result<Conversation, RepositoryError> {
        if let Some(id) = id {
            let row = sqlx::query("SELECT * FROM conversation WHERE id = ?")
                .bind(&id.0)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(row) = row {
                let messages_text: String = row.try_get("messages")?;
                let messages: Vec<ConversationMessage> = serde_json::from_str(&messages_text)
                    .map_err(|error| {
                        RepositoryError::Decode(format!("invalid messages payload: {error}"))
                    })?;
                let skus_text: String = row.try_get("recommended_skus")?;
                let recommended_skus: Vec<String> =
                    serde_json::from_str(&skus_text).map_err(|error| {
                        RepositoryError::Decode(format!("invalid sku payload: {error}"))
                    })?;
                return Ok(Conversation {
                    id: ConversationId(row.try_get("id")?),
                    store_id: row.try_get("store_id")?,
                    user_id: row.try_get("user_id")?,
                    messages,
                    recommended_skus,
                    created_at: parse_timestamp(&row, "created_at")?,
                    updated_at: parse_timestamp(&row, "updated_at")?,
                });
            }
            // Unknown id falls through to creation, same as no id at all.
        }

        let conversation = Conversation::new(store_id, user_id);
        sqlx::query(
            "INSERT INTO conversation (id, store_id, user_id, messages, recommended_skus, \
             created_at, updated_at) VALUES (?, ?, ?, '[]', '[]', ?, ?)",
        )
        .bind(&conversation.id.0)
        .bind(&conversation.store_id)
        .bind(&conversation.user_id)
        .bind(conversation.created_at.to_rfc3339())
        .bind(conversation.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(conversation)
    }

    async fn append_turn(
        &self,
        id: &ConversationId,
        user_message: &str,
        assistant_message: &str,
        new_skus: &[String],
    ) -> Result<(), RepositoryError> {
        // Read-modify-write against the latest row inside one transaction so
        // a concurrent turn's messages are appended to, not overwritten.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT messages, recommended_skus FROM conversation WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(RepositoryError::Decode(format!("conversation `{}` not found", id.0)));
        };

        let messages_text: String = row.try_get("messages")?;
        let mut messages: Vec<ConversationMessage> = serde_json::from_str(&messages_text)
            .map_err(|error| RepositoryError::Decode(format!("invalid messages payload: {error}")))?;
        let skus_text: String = row.try_get("recommended_skus")?;
        let mut recommended_skus: Vec<String> = serde_json::from_str(&skus_text)
            .map_err(|error| RepositoryError::Decode(format!("invalid sku payload: {error}")))?;

        let now = Utc::now();
        messages.push(ConversationMessage {
            role: MessageRole::User,
            content: user_message.to_string(),
            timestamp: now,
        });
        messages.push(ConversationMessage {
            role: MessageRole::Assistant,
            content: assistant_message.to_string(),
            timestamp: now,
        });
        for sku in new_skus {
            if !recommended_skus.contains(sku) {
                recommended_skus.push(sku.clone());
            }
        }

        let messages_payload = serde_json::to_string(&messages)
            .map_err(|error| RepositoryError::Decode(format!("encode messages: {error}")))?;
        let skus_payload = serde_json::to_string(&recommended_skus)
            .map_err(|error| RepositoryError::Decode(format!("encode skus: {error}")))?;

        sqlx::query(
            "UPDATE conversation SET messages = ?, recommended_skus = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(messages_payload)
        .bind(skus_payload)
        .bind(now.to_rfc3339())
        .bind(&id.0)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
