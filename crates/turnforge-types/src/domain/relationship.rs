use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Directed relationship between two entities.
///
/// Not symmetric by construction; callers maintain directionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub a_id: String,
    pub b_id: String,
    pub rel_type: String,
    pub intensity: i64,
    #[serde(default)]
    pub notes: Value,
}

impl Relationship {
    pub fn new(
        a_id: impl Into<String>,
        b_id: impl Into<String>,
        rel_type: impl Into<String>,
        intensity: i64,
    ) -> Self {
        Self {
            a_id: a_id.into(),
            b_id: b_id.into(),
            rel_type: rel_type.into(),
            intensity,
            notes: Value::Null,
        }
    }
}
