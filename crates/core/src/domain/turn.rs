use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constraints::SearchConstraints;

/// One inbound assistant turn: a non-empty transcript plus optional
/// conversation continuity and shopper constraints.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub store_id: String,
    pub user_id: String,
    pub transcript: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub constraints: Option<SearchConstraints>,
}

/// Fully hydrated product view for the response; built only from catalog
/// data, never from provider text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    pub location: String,
    pub why_it_works: String,
    pub attributes: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub location: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMetadata {
    pub processing_time_ms: u64,
    pub inventory_searched: bool,
    pub items_considered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The user-visible contract. Always well-formed: failure modes surface as a
/// safe-fallback message with confidence 0, never as an error.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub assistant_message: String,
    pub follow_up_questions: Vec<String>,
    pub recommended_items: Vec<ProductCard>,
    pub add_on_items: Vec<ProductCard>,
    pub cart_suggestion: Vec<CartLine>,
    pub safety_notes: Vec<String>,
    pub confidence: f32,
    pub metadata: TurnMetadata,
}

/// Write-once analytics record for one turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnLog {
    pub conversation_id: Option<String>,
    pub store_id: String,
    pub user_id: String,
    pub user_message: String,
    pub assistant_message: String,
    pub recommended_skus: Vec<String>,
    pub latency_ms: u64,
    pub intent: String,
    pub constraints: SearchConstraints,
    pub error: Option<String>,
}
