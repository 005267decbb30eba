use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stack of items held by an owner. Rows with `qty <= 0` are deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub owner_id: String,
    pub item_id: String,
    pub qty: i64,
    #[serde(default)]
    pub flags: serde_json::Map<String, Value>,
}

impl InventoryRow {
    pub fn new(owner_id: impl Into<String>, item_id: impl Into<String>, qty: i64) -> Self {
        Self {
            owner_id: owner_id.into(),
            item_id: item_id.into(),
            qty,
            flags: serde_json::Map::new(),
        }
    }
}
