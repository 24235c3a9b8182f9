use crate::domain::constraints::SearchConstraints;
use crate::domain::inventory::InventoryItem;

const DRILLING_REQUIRED_TAG: &str = "drilling-required";
const NO_TOOLS_TAG: &str = "no-tools";
const NO_DAMAGE_TAG: &str = "no-damage";

/// Constraint post-filter chain. Each check is a hard exclusion applied in
/// fixed order: budget, drilling, tools, weight capacity, surface type.
pub fn passes_constraints(item: &InventoryItem, constraints: &SearchConstraints) -> bool {
    if let Some(max_budget) = constraints.max_budget {
        if item.price > max_budget {
            return false;
        }
    }

    if (constraints.no_damage() || constraints.no_drilling())
        && (item.has_tag(DRILLING_REQUIRED_TAG) || item.requires_drill())
    {
        return false;
    }

    if constraints.no_tools() && !item.has_tag(NO_TOOLS_TAG) && !item.has_tag(NO_DAMAGE_TAG) {
        return false;
    }

    if let Some(min_weight) = constraints.min_weight {
        // An item with no stated capacity is unknown, not disqualified.
        if let Some(capacity) = item.weight_capacity_lbs() {
            if capacity < min_weight {
                return false;
            }
        }
    }

    if let Some(surface) = constraints.surface_type.as_deref() {
        let wanted = surface.to_lowercase();
        let surfaces = item.surface_types();
        if !surfaces.is_empty()
            && !surfaces.iter().any(|candidate| candidate.to_lowercase().contains(&wanted))
        {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    use super::passes_constraints;
    use crate::domain::constraints::SearchConstraints;
    use crate::domain::inventory::{InventoryItem, ItemId};

    fn item(sku: &str, tags: &[&str], attributes: Value) -> InventoryItem {
        InventoryItem {
            id: ItemId(format!("item-{sku}")),
            store_id: "store-1".to_string(),
            sku: sku.to_string(),
            name: sku.to_string(),
            description: String::new(),
            category: "hanging".to_string(),
            price: Decimal::new(1299, 2),
            stock: 10,
            aisle: "B2".to_string(),
            bin: None,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            attributes,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_drilling_excludes_drilling_required_tag() {
        let anchors = item(
            "DRYWALL-ANCHOR-50",
            &["drilling-required", "drywall", "anchors"],
            json!({"requires_drill": true}),
        );
        let strips = item("CMD-STRIPS-MED", &["no-damage", "no-tools"], json!({}));
        let constraints =
            SearchConstraints { no_drilling: Some(true), ..SearchConstraints::default() };

        assert!(!passes_constraints(&anchors, &constraints));
        assert!(passes_constraints(&strips, &constraints));
    }

    #[test]
    fn no_damage_excludes_drill_attribute_even_without_tag() {
        let hidden_drill = item("TOGGLE-BOLT-20", &["heavy-duty"], json!({"requires_drill": true}));
        let constraints =
            SearchConstraints { no_damage: Some(true), ..SearchConstraints::default() };
        assert!(!passes_constraints(&hidden_drill, &constraints));
    }

    #[test]
    fn no_tools_requires_a_qualifying_tag() {
        let hooks = item("MONKEY-HOOK-10", &["no-tools"], json!({}));
        let strips = item("CMD-STRIPS-SM", &["no-damage"], json!({}));
        let bolts = item("TOGGLE-BOLT-20", &["heavy-duty"], json!({}));
        let constraints = SearchConstraints { no_tools: Some(true), ..SearchConstraints::default() };

        assert!(passes_constraints(&hooks, &constraints));
        assert!(passes_constraints(&strips, &constraints));
        assert!(!passes_constraints(&bolts, &constraints));
    }

    #[test]
    fn min_weight_never_excludes_unknown_capacity() {
        let rated = item("CMD-STRIPS-MED", &[], json!({"weight_capacity_lbs": 12}));
        let unrated = item("PICTURE-WIRE-25", &[], json!({}));
        let constraints =
            SearchConstraints { min_weight: Some(30.0), ..SearchConstraints::default() };

        assert!(!passes_constraints(&rated, &constraints));
        assert!(passes_constraints(&unrated, &constraints));
    }

    #[test]
    fn budget_ceiling_is_inclusive() {
        let constraints = SearchConstraints {
            max_budget: Some(Decimal::new(1299, 2)),
            ..SearchConstraints::default()
        };
        let exact = item("A", &[], json!({}));
        assert!(passes_constraints(&exact, &constraints));

        let over = SearchConstraints {
            max_budget: Some(Decimal::new(1000, 2)),
            ..SearchConstraints::default()
        };
        assert!(!passes_constraints(&exact, &over));
    }

    #[test]
    fn surface_type_matches_substring_case_insensitively() {
        let strips =
            item("CMD-STRIPS-MED", &[], json!({"surface_types": ["painted drywall", "tile"]}));
        let unknown_surface = item("PICTURE-WIRE-25", &[], json!({}));

        let drywall = SearchConstraints {
            surface_type: Some("Drywall".to_string()),
            ..SearchConstraints::default()
        };
        let brick = SearchConstraints {
            surface_type: Some("brick".to_string()),
            ..SearchConstraints::default()
        };

        assert!(passes_constraints(&strips, &drywall));
        assert!(!passes_constraints(&strips, &brick));
        assert!(passes_constraints(&unknown_surface, &brick));
    }
}
