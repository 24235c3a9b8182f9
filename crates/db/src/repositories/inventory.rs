use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row};

use shelfwise_core::domain::inventory::{InventoryItem, ItemId};
use shelfwise_core::retrieval::InventoryQuery;

use super::{InventoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInventoryRepository {
    pool: DbPool,
}

impl SqlInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InventoryRepository for SqlInventoryRepository {
    async fn search(&self, query: &InventoryQuery) -> Result<Vec<InventoryItem>, RepositoryError> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT * FROM inventory_item WHERE store_id = ");
        builder.push_bind(&query.store_id);

        if query.in_stock_only {
            builder.push(" AND stock > 0");
        }

        if !query.terms.is_empty() {
            builder.push(" AND (");
            for (index, term) in query.terms.iter().enumerate() {
                if index > 0 {
                    builder.push(" OR ");
                }
                let needle = format!("%{}%", term.to_lowercase());
                builder.push("lower(name) LIKE ");
                builder.push_bind(needle.clone());
                builder.push(" OR lower(description) LIKE ");
                builder.push_bind(needle.clone());
                builder.push(" OR lower(category) LIKE ");
                builder.push_bind(needle);
                builder.push(
                    " OR EXISTS (SELECT 1 FROM json_each(inventory_item.tags) \
                     WHERE lower(json_each.value) = ",
                );
                builder.push_bind(term.to_lowercase());
                builder.push(")");
            }
            builder.push(")");
        }

        builder.push(" ORDER BY stock DESC, name ASC LIMIT ");
        builder.push_bind(query.limit as i64);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_item).collect()
    }

    async fn find_by_sku(
        &self,
        store_id: &str,
        sku: &str,
    ) -> Result<Option<InventoryItem>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM inventory_item WHERE store_id = ? AND sku = ?")
            .bind(store_id)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_item).transpose()
    }
}

fn row_to_item(row: &SqliteRow) -> Result<InventoryItem, RepositoryError> {
    let price_text: String = row.try_get("price")?;
    let price = price_text
        .parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("invalid price `{price_text}`: {error}")))?;

    let tags_text: String = row.try_get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_text)
        .map_err(|error| RepositoryError::Decode(format!("invalid tags payload: {error}")))?;

    let attributes_text: String = row.try_get("attributes")?;
    let attributes = serde_json::from_str(&attributes_text)
        .map_err(|error| RepositoryError::Decode(format!("invalid attributes payload: {error}")))?;

    Ok(InventoryItem {
        id: ItemId(row.try_get("id")?),
        store_id: row.try_get("store_id")?,
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        price,
        stock: row.try_get("stock")?,
        aisle: row.try_get("aisle")?,
        bin: row.try_get("bin")?,
        tags,
        attributes,
        created_at: parse_timestamp(row, "created_at")?,
        updated_at: parse_timestamp(row, "updated_at")?,
    })
}

pub(crate) fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let text: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp `{text}`: {error}")))
}
