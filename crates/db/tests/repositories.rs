use shelfwise_core::domain::conversation::ConversationId;
use shelfwise_core::domain::turn::TurnLog;
use shelfwise_core::SearchConstraints;
use shelfwise_core::retrieval::InventoryQuery;
use shelfwise_db::fixtures::{DemoSeedDataset, DEMO_STORE_ID};
use shelfwise_db::repositories::{
    AnalyticsSink, ConversationStore, InventoryRepository, SqlAnalyticsSink, SqlConversationStore,
    SqlInventoryRepository, SqlStoreRepository, StoreRepository,
};
use shelfwise_db::{connect_with_settings, migrations, DbPool};

async fn seeded_pool(name: &str) -> DbPool {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let pool = connect_with_settings(&url, 1, 5).await.expect("in-memory database connects");
    migrations::run_pending(&pool).await.expect("migrations apply");
    DemoSeedDataset::load(&pool).await.expect("seed loads");
    pool
}

fn query(terms: &[&str]) -> InventoryQuery {
    InventoryQuery {
        store_id: DEMO_STORE_ID.to_string(),
        terms: terms.iter().map(|term| term.to_string()).collect(),
        in_stock_only: true,
        limit: 50,
    }
}

#[tokio::test]
async fn seed_dataset_verifies() {
    let pool = seeded_pool("repo_seed").await;
    let verification = DemoSeedDataset::verify(&pool).await.expect("verify runs");
    assert!(verification.all_present, "failed checks: {:?}", verification.checks);
}

#[tokio::test]
async fn search_matches_text_and_tags_ordered_by_stock() {
    let pool = seeded_pool("repo_search").await;
    let repo = SqlInventoryRepository::new(pool);

    let results = repo.search(&query(&["hanging"])).await.expect("search runs");
    assert!(!results.is_empty());
    // Ordered by stock descending; CMD-STRIPS-SM has the deepest stock (52).
    assert_eq!(results[0].sku, "CMD-STRIPS-SM");
    let stocks: Vec<i64> = results.iter().map(|item| item.stock).collect();
    let mut sorted = stocks.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(stocks, sorted);

    // Exact tag match works for hyphenated tags.
    let tagged = repo.search(&query(&["drilling-required"])).await.expect("search runs");
    assert_eq!(tagged.len(), 3);
    assert!(tagged.iter().all(|item| item.tags.iter().any(|tag| tag == "drilling-required")));
}

#[tokio::test]
async fn search_with_no_terms_browses_the_store() {
    let pool = seeded_pool("repo_browse").await;
    let repo = SqlInventoryRepository::new(pool);

    let results = repo.search(&query(&[])).await.expect("search runs");
    assert_eq!(results.len(), 8);
}

#[tokio::test]
async fn find_by_sku_decodes_price_and_attributes() {
    let pool = seeded_pool("repo_sku").await;
    let repo = SqlInventoryRepository::new(pool);

    let item = repo
        .find_by_sku(DEMO_STORE_ID, "CMD-STRIPS-MED")
        .await
        .expect("query runs")
        .expect("item exists");
    assert_eq!(item.price.to_string(), "8.99");
    assert_eq!(item.weight_capacity_lbs(), Some(12.0));
    assert_eq!(item.location_label(), "Aisle A3, Bin 12");

    let missing = repo.find_by_sku(DEMO_STORE_ID, "NOPE").await.expect("query runs");
    assert!(missing.is_none());
}

#[tokio::test]
async fn store_policy_round_trips_from_json_column() {
    let pool = seeded_pool("repo_policy").await;
    let repo = SqlStoreRepository::new(pool);

    let policy = repo
        .find_policy(DEMO_STORE_ID)
        .await
        .expect("query runs")
        .expect("demo store has a policy");
    assert!(policy.prefer_no_damage);
    assert!(policy.safety_disclaimers);

    let unknown = repo.find_policy("store-unknown").await.expect("query runs");
    assert!(unknown.is_none());
}

#[tokio::test]
async fn conversations_append_rather_than_overwrite() {
    let pool = seeded_pool("repo_conversation").await;
    let store = SqlConversationStore::new(pool);

    let created = store
        .get_or_create(None, DEMO_STORE_ID, "user-1")
        .await
        .expect("conversation created");
    store
        .append_turn(&created.id, "hang a picture", "use strips", &["CMD-STRIPS-MED".to_string()])
        .await
        .expect("first append");
    store
        .append_turn(
            &created.id,
            "anything stronger?",
            "monkey hooks",
            &["MONKEY-HOOK-50".to_string(), "CMD-STRIPS-MED".to_string()],
        )
        .await
        .expect("second append");

    let reloaded = store
        .get_or_create(Some(&created.id), DEMO_STORE_ID, "user-1")
        .await
        .expect("conversation reloads");
    assert_eq!(reloaded.messages.len(), 4);
    assert_eq!(reloaded.recommended_skus, vec!["CMD-STRIPS-MED", "MONKEY-HOOK-50"]);

    // Unknown supplied id creates a fresh conversation instead of failing.
    let fresh = store
        .get_or_create(Some(&ConversationId("missing".to_string())), DEMO_STORE_ID, "user-1")
        .await
        .expect("fresh conversation");
    assert_ne!(fresh.id.0, "missing");
    assert!(fresh.messages.is_empty());
}

#[tokio::test]
async fn analytics_overview_aggregates_turns() {
    let pool = seeded_pool("repo_analytics").await;
    let sink = SqlAnalyticsSink::new(pool);

    for (intent, sku, latency) in [
        ("hang_item", "CMD-STRIPS-MED", 120),
        ("hang_item", "CMD-STRIPS-MED", 180),
        ("repair", "TOGGLE-BOLT-20", 90),
    ] {
        sink.record_turn(TurnLog {
            conversation_id: Some("conv-1".to_string()),
            store_id: DEMO_STORE_ID.to_string(),
            user_id: "user-1".to_string(),
            user_message: "question".to_string(),
            assistant_message: "answer".to_string(),
            recommended_skus: vec![sku.to_string()],
            latency_ms: latency,
            intent: intent.to_string(),
            constraints: SearchConstraints::default(),
            error: None,
        })
        .await
        .expect("log records");
    }

    let overview = sink.overview(DEMO_STORE_ID).await.expect("overview runs");
    assert_eq!(overview.total_turns, 3);
    assert_eq!(overview.average_latency_ms, 130.0);
    assert_eq!(overview.top_intents[0].intent, "hang_item");
    assert_eq!(overview.top_intents[0].count, 2);
    assert_eq!(overview.top_recommended_skus[0].sku, "CMD-STRIPS-MED");
}
