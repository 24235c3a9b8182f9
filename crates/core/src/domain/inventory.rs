use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

/// One catalog entry as the pipeline sees it: already deserialized, read-only
/// for the duration of a turn.
///
/// `attributes` is an open JSON object; the well-known keys
/// (`weight_capacity_lbs`, `requires_drill`, `surface_types`) have typed
/// accessors, everything else passes through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub store_id: String,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i64,
    pub aisle: String,
    pub bin: Option<String>,
    pub tags: Vec<String>,
    pub attributes: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Shopper-facing shelf location, e.g. "Aisle A3, Bin 12".
    pub fn location_label(&self) -> String {
        match &self.bin {
            Some(bin) => format!("Aisle {}, Bin {}", self.aisle, bin),
            None => format!("Aisle {}", self.aisle),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
    }

    pub fn weight_capacity_lbs(&self) -> Option<f64> {
        self.attributes.get("weight_capacity_lbs").and_then(Value::as_f64)
    }

    pub fn requires_drill(&self) -> bool {
        self.attributes.get("requires_drill").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn surface_types(&self) -> Vec<String> {
        self.attributes
            .get("surface_types")
            .and_then(Value::as_array)
            .map(|surfaces| {
                surfaces.iter().filter_map(Value::as_str).map(str::to_string).collect()
            })
            .unwrap_or_default()
    }
}
