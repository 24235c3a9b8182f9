//! Candidate retrieval: from free-text utterance to the turn's allowed set.

pub mod filters;
pub mod terms;

use std::collections::HashSet;

use crate::domain::constraints::SearchConstraints;
use crate::domain::inventory::InventoryItem;

/// Hard cap on candidates handed to the reasoning provider.
pub const RESULT_CAP: usize = 20;
/// Breadth of the repository text query before constraint filtering.
pub const SEARCH_BREADTH_CAP: usize = 50;

/// The ordered, deduplicated SKUs judged relevant and in stock for one turn.
///
/// This is the single source of truth the validator checks provider output
/// against; it is built once per turn and exposes no mutation.
#[derive(Clone, Debug, Default)]
pub struct AllowedSet {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl AllowedSet {
    pub fn from_items(items: &[InventoryItem]) -> Self {
        let mut ordered = Vec::with_capacity(items.len());
        let mut members = HashSet::with_capacity(items.len());
        for item in items {
            if members.insert(item.sku.clone()) {
                ordered.push(item.sku.clone());
            }
        }
        Self { ordered, members }
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.members.contains(sku)
    }

    pub fn skus(&self) -> &[String] {
        &self.ordered
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }
}

/// Store-scoped text query handed to the inventory repository. An empty
/// `terms` list means browse mode: only the store/stock restrictions apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryQuery {
    pub store_id: String,
    pub terms: Vec<String>,
    pub in_stock_only: bool,
    pub limit: usize,
}

impl InventoryQuery {
    pub fn for_turn(store_id: &str, utterance: &str) -> Self {
        Self {
            store_id: store_id.to_string(),
            terms: terms::extract_search_terms(utterance),
            in_stock_only: true,
            limit: SEARCH_BREADTH_CAP,
        }
    }
}

/// Applies the fixed-order constraint post-filters and the result cap to
/// items the repository already matched by text. Repository order (stock
/// descending, name ascending) is preserved.
pub fn select_candidates(
    items: Vec<InventoryItem>,
    constraints: &SearchConstraints,
    cap: usize,
) -> Vec<InventoryItem> {
    items
        .into_iter()
        .filter(|item| filters::passes_constraints(item, constraints))
        .take(cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{select_candidates, AllowedSet, InventoryQuery};
    use crate::domain::constraints::SearchConstraints;
    use crate::domain::inventory::{InventoryItem, ItemId};

    fn item(sku: &str, stock: i64) -> InventoryItem {
        InventoryItem {
            id: ItemId(format!("item-{sku}")),
            store_id: "store-1".to_string(),
            sku: sku.to_string(),
            name: sku.to_string(),
            description: String::new(),
            category: "hanging".to_string(),
            price: Decimal::new(999, 2),
            stock,
            aisle: "A1".to_string(),
            bin: None,
            tags: Vec::new(),
            attributes: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn allowed_set_dedupes_and_preserves_order() {
        let items = vec![item("B", 5), item("A", 3), item("B", 5)];
        let allowed = AllowedSet::from_items(&items);
        assert_eq!(allowed.skus(), ["B", "A"]);
        assert!(allowed.contains("A"));
        assert!(!allowed.contains("C"));
        assert_eq!(allowed.len(), 2);
    }

    #[test]
    fn query_for_turn_defaults_to_in_stock_breadth_cap() {
        let query = InventoryQuery::for_turn("store-1", "hang a picture");
        assert!(query.in_stock_only);
        assert_eq!(query.limit, super::SEARCH_BREADTH_CAP);
        assert!(query.terms.contains(&"hang".to_string()));
    }

    #[test]
    fn select_candidates_truncates_to_cap() {
        let items = (0..30).map(|index| item(&format!("SKU-{index:02}"), 30 - index)).collect();
        let selected = select_candidates(items, &SearchConstraints::default(), 20);
        assert_eq!(selected.len(), 20);
        assert_eq!(selected[0].sku, "SKU-00");
    }
}
