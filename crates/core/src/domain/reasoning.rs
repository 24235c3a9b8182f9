use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One cart line suggested by the reasoning provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRequest {
    pub sku: String,
    pub qty: u32,
}

/// Untrusted structured result from a reasoning provider.
///
/// Wire contract: `assistant_message`, `recommended_skus`, and `confidence`
/// are required; every other key defaults to empty when absent. Nothing in
/// this struct may reach a response without passing Truth-Mode validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReasoningOutput {
    pub assistant_message: String,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    pub recommended_skus: Vec<String>,
    #[serde(default)]
    pub add_on_skus: Vec<String>,
    #[serde(default)]
    pub cart: Vec<CartRequest>,
    #[serde(default)]
    pub safety_notes: Vec<String>,
    #[serde(default)]
    pub reasoning: BTreeMap<String, String>,
    pub confidence: f32,
}
