use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-store assistant configuration, mutated only by store administrators
/// and read-only during a turn. A store with no stored policy gets the
/// defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorePolicy {
    pub prefer_no_damage: bool,
    pub prefer_no_tools: bool,
    pub suggest_drilling_first: bool,
    pub safety_disclaimers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_budget_default: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            prefer_no_damage: false,
            prefer_no_tools: false,
            suggest_drilling_first: false,
            safety_disclaimers: true,
            max_budget_default: None,
            custom_instructions: None,
        }
    }
}
