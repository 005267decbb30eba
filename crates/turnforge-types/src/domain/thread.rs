use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Active,
    Resolved,
    Abandoned,
}

/// A narrative thread the campaign is tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub status: ThreadStatus,
    #[serde(default)]
    pub stakes: Value,
    #[serde(default)]
    pub related_entity_ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Thread {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: ThreadStatus) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            stakes: Value::Null,
            related_entity_ids: Vec::new(),
            tags: Vec::new(),
        }
    }
}
