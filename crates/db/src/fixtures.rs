use sqlx::Executor;
use sqlx::Row;

use crate::repositories::RepositoryError;
use crate::DbPool;

pub const DEMO_STORE_ID: &str = "store-demo-001";

const SEED_SKUS: &[&str] = &[
    "CMD-STRIPS-SM",
    "CMD-STRIPS-MED",
    "CMD-STRIPS-LG",
    "MONKEY-HOOK-10",
    "MONKEY-HOOK-50",
    "DRYWALL-ANCHOR-50",
    "TOGGLE-BOLT-20",
    "SNAP-TOGGLE-10",
];

#[derive(Clone, Debug)]
pub struct SeedSummary {
    pub stores: usize,
    pub items: usize,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Deterministic demo dataset: one hardware store plus the hanging/anchor
/// catalog used by docs and smoke checks. Loading is idempotent.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedSummary, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::raw_sql(Self::SQL)).await?;
        tx.commit().await?;
        Ok(SeedSummary { stores: 1, items: SEED_SKUS.len() })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks: Vec<(&'static str, bool)> = Vec::new();

        let (store_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM store WHERE id = ?")
            .bind(DEMO_STORE_ID)
            .fetch_one(pool)
            .await?;
        checks.push(("demo_store_present", store_count == 1));

        let rows = sqlx::query("SELECT sku FROM inventory_item WHERE store_id = ?")
            .bind(DEMO_STORE_ID)
            .fetch_all(pool)
            .await?;
        let skus: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String, _>("sku"))
            .collect::<Result<_, _>>()?;
        checks.push(("all_seed_skus_present", SEED_SKUS.iter().all(|sku| skus.iter().any(|have| have == sku))));

        let (in_stock,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM inventory_item WHERE store_id = ? AND stock > 0",
        )
        .bind(DEMO_STORE_ID)
        .fetch_one(pool)
        .await?;
        checks.push(("all_items_in_stock", in_stock == SEED_SKUS.len() as i64));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}
