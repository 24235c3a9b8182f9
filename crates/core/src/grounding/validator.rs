use std::collections::HashSet;

use crate::domain::reasoning::ReasoningOutput;
use crate::retrieval::AllowedSet;

/// Result of checking a provider payload against the turn's allowed set.
#[derive(Clone, Debug, PartialEq)]
pub struct TruthValidation {
    pub is_valid: bool,
    /// Out-of-catalog SKUs the provider referenced, deduplicated in
    /// first-seen order.
    pub invalid_skus: Vec<String>,
    pub output: ReasoningOutput,
}

/// Filters every sku-bearing field of a provider payload down to allowed-set
/// membership. Pure set-membership, never fuzzy: an unknown SKU is dropped,
/// not repaired.
///
/// Total and idempotent - re-validating already-validated output against the
/// same allowed set is a no-op with `is_valid = true`.
pub fn validate(output: ReasoningOutput, allowed: &AllowedSet) -> TruthValidation {
    let mut offending: Vec<String> = Vec::new();

    let recommended_skus = output
        .recommended_skus
        .into_iter()
        .filter(|sku| keep_or_record(sku, allowed, &mut offending))
        .collect();

    let add_on_skus = output
        .add_on_skus
        .into_iter()
        .filter(|sku| keep_or_record(sku, allowed, &mut offending))
        .collect();

    let cart = output
        .cart
        .into_iter()
        .filter(|line| keep_or_record(&line.sku, allowed, &mut offending))
        .collect();

    let reasoning = output
        .reasoning
        .into_iter()
        .filter(|(sku, _)| allowed.contains(sku))
        .collect();

    let mut seen = HashSet::new();
    let invalid_skus: Vec<String> =
        offending.into_iter().filter(|sku| seen.insert(sku.clone())).collect();

    TruthValidation {
        is_valid: invalid_skus.is_empty(),
        invalid_skus,
        output: ReasoningOutput {
            assistant_message: output.assistant_message,
            follow_up_questions: output.follow_up_questions,
            recommended_skus,
            add_on_skus,
            cart,
            safety_notes: output.safety_notes,
            reasoning,
            confidence: output.confidence,
        },
    }
}

fn keep_or_record(sku: &str, allowed: &AllowedSet, offending: &mut Vec<String>) -> bool {
    if allowed.contains(sku) {
        true
    } else {
        offending.push(sku.to_string());
        false
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::validate;
    use crate::domain::inventory::{InventoryItem, ItemId};
    use crate::domain::reasoning::{CartRequest, ReasoningOutput};
    use crate::retrieval::AllowedSet;

    fn allowed(skus: &[&str]) -> AllowedSet {
        let items: Vec<InventoryItem> = skus
            .iter()
            .map(|sku| InventoryItem {
                id: ItemId(format!("item-{sku}")),
                store_id: "store-1".to_string(),
                sku: sku.to_string(),
                name: sku.to_string(),
                description: String::new(),
                category: "hanging".to_string(),
                price: Decimal::new(899, 2),
                stock: 10,
                aisle: "A3".to_string(),
                bin: None,
                tags: Vec::new(),
                attributes: json!({}),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect();
        AllowedSet::from_items(&items)
    }

    fn output_with(recommended: &[&str], add_ons: &[&str], cart: &[(&str, u32)]) -> ReasoningOutput {
        ReasoningOutput {
            assistant_message: "Here are some options.".to_string(),
            follow_up_questions: Vec::new(),
            recommended_skus: recommended.iter().map(|sku| sku.to_string()).collect(),
            add_on_skus: add_ons.iter().map(|sku| sku.to_string()).collect(),
            cart: cart
                .iter()
                .map(|(sku, qty)| CartRequest { sku: sku.to_string(), qty: *qty })
                .collect(),
            safety_notes: Vec::new(),
            reasoning: BTreeMap::new(),
            confidence: 0.85,
        }
    }

    #[test]
    fn accepts_output_fully_inside_allowed_set() {
        let allowed = allowed(&["CMD-STRIPS-MED", "MONKEY-HOOK-10"]);
        let output =
            output_with(&["CMD-STRIPS-MED"], &["MONKEY-HOOK-10"], &[("CMD-STRIPS-MED", 1)]);

        let result = validate(output, &allowed);
        assert!(result.is_valid);
        assert!(result.invalid_skus.is_empty());
        assert_eq!(result.output.recommended_skus, vec!["CMD-STRIPS-MED"]);
    }

    #[test]
    fn strips_fabricated_skus_and_reports_them_once() {
        let allowed = allowed(&["CMD-STRIPS-MED"]);
        let mut output = output_with(
            &["CMD-STRIPS-MED", "FAKE-SKU"],
            &["FAKE-SKU"],
            &[("CMD-STRIPS-MED", 1), ("NONEXISTENT-ITEM", 2)],
        );
        output.reasoning.insert("CMD-STRIPS-MED".to_string(), "valid".to_string());
        output.reasoning.insert("FAKE-SKU".to_string(), "should be filtered".to_string());

        let result = validate(output, &allowed);
        assert!(!result.is_valid);
        assert_eq!(result.invalid_skus, vec!["FAKE-SKU", "NONEXISTENT-ITEM"]);
        assert_eq!(result.output.recommended_skus, vec!["CMD-STRIPS-MED"]);
        assert!(result.output.add_on_skus.is_empty());
        assert_eq!(result.output.cart, vec![CartRequest { sku: "CMD-STRIPS-MED".into(), qty: 1 }]);
        assert!(result.output.reasoning.contains_key("CMD-STRIPS-MED"));
        assert!(!result.output.reasoning.contains_key("FAKE-SKU"));
    }

    #[test]
    fn empty_recommendations_are_valid() {
        let allowed = allowed(&["CMD-STRIPS-MED"]);
        let result = validate(output_with(&[], &[], &[]), &allowed);
        assert!(result.is_valid);
    }

    #[test]
    fn validation_is_idempotent() {
        let allowed = allowed(&["CMD-STRIPS-MED"]);
        let output = output_with(&["CMD-STRIPS-MED", "FAKE-1"], &["FAKE-2"], &[("FAKE-1", 1)]);

        let first = validate(output, &allowed);
        let second = validate(first.output.clone(), &allowed);
        assert!(second.is_valid);
        assert!(second.invalid_skus.is_empty());
        assert_eq!(second.output, first.output);
    }

    #[test]
    fn all_invalid_leaves_everything_empty() {
        let allowed = allowed(&["CMD-STRIPS-MED"]);
        let result = validate(output_with(&["FAKE-1", "FAKE-2"], &["FAKE-3"], &[("FAKE-1", 1)]), &allowed);
        assert!(!result.is_valid);
        assert!(result.output.recommended_skus.is_empty());
        assert!(result.output.add_on_skus.is_empty());
        assert!(result.output.cart.is_empty());
    }

    #[test]
    fn validates_against_empty_allowed_set() {
        let allowed = allowed(&[]);
        let result = validate(output_with(&["ANYTHING"], &[], &[]), &allowed);
        assert!(!result.is_valid);
        assert_eq!(result.invalid_skus, vec!["ANYTHING"]);
    }
}
