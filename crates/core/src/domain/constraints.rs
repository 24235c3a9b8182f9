use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::policy::StorePolicy;

/// Turn-scoped search constraints. Built once per turn and never mutated
/// afterwards; consumer-facing search always implies `in_stock_only`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConstraints {
    pub no_damage: Option<bool>,
    pub no_tools: Option<bool>,
    pub no_drilling: Option<bool>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub max_budget: Option<Decimal>,
    pub surface_type: Option<String>,
    pub in_stock_only: bool,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            no_damage: None,
            no_tools: None,
            no_drilling: None,
            min_weight: None,
            max_weight: None,
            max_budget: None,
            surface_type: None,
            in_stock_only: true,
        }
    }
}

impl SearchConstraints {
    pub fn no_damage(&self) -> bool {
        self.no_damage.unwrap_or(false)
    }

    pub fn no_tools(&self) -> bool {
        self.no_tools.unwrap_or(false)
    }

    pub fn no_drilling(&self) -> bool {
        self.no_drilling.unwrap_or(false)
    }

    /// Fills gaps from store policy defaults. An explicit request value always
    /// wins; currently only the budget ceiling has a policy-level default.
    /// `prefer_*` policy flags are preferences surfaced to the reasoning
    /// provider, not hard filters, so they are not merged here.
    pub fn merged_with_policy(mut self, policy: &StorePolicy) -> Self {
        if self.max_budget.is_none() {
            self.max_budget = policy.max_budget_default;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::SearchConstraints;
    use crate::domain::policy::StorePolicy;

    #[test]
    fn defaults_imply_in_stock_only() {
        let constraints = SearchConstraints::default();
        assert!(constraints.in_stock_only);
        assert!(!constraints.no_drilling());
    }

    #[test]
    fn policy_budget_default_fills_missing_budget_only() {
        let policy = StorePolicy {
            max_budget_default: Some(Decimal::new(2500, 2)),
            ..StorePolicy::default()
        };

        let merged = SearchConstraints::default().merged_with_policy(&policy);
        assert_eq!(merged.max_budget, Some(Decimal::new(2500, 2)));

        let explicit = SearchConstraints {
            max_budget: Some(Decimal::new(1000, 2)),
            ..SearchConstraints::default()
        }
        .merged_with_policy(&policy);
        assert_eq!(explicit.max_budget, Some(Decimal::new(1000, 2)));
    }

    #[test]
    fn deserializes_camel_case_wire_names() {
        let constraints: SearchConstraints =
            serde_json::from_str(r#"{"noDrilling":true,"minWeight":20}"#).expect("valid JSON");
        assert_eq!(constraints.no_drilling, Some(true));
        assert_eq!(constraints.min_weight, Some(20.0));
        assert!(constraints.in_stock_only);
    }
}
