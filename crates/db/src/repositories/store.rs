use sqlx::Row;

use shelfwise_core::domain::policy::StorePolicy;

use super::{RepositoryError, StoreRepository};
use crate::DbPool;

pub struct SqlStoreRepository {
    pool: DbPool,
}

impl SqlStoreRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl StoreRepository for SqlStoreRepository {
    async fn find_policy(&self, store_id: &str) -> Result<Option<StorePolicy>, RepositoryError> {
        let row = sqlx::query("SELECT policies FROM store WHERE id = ?")
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let text: String = row.try_get("policies")?;
                let policy = serde_json::from_str(&text).map_err(|error| {
                    RepositoryError::Decode(format!("invalid store policy payload: {error}"))
                })?;
                Ok(Some(policy))
            }
        }
    }
}
