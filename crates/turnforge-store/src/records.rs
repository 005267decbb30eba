use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A campaign row: the durable identity of one game plus its config blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub calibration: Value,
    #[serde(default)]
    pub system: Value,
    #[serde(default)]
    pub genre_rules: Value,
    pub current_turn: i64,
    pub created_at: String,
}

/// One sitting of play, bookkept for "previously on" summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub campaign_id: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub turn_start: i64,
    pub turn_end: Option<i64>,
}
