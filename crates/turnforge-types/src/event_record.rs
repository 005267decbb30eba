use serde::{Deserialize, Serialize};

/// Append-only record of one resolved turn.
///
/// Sub-objects are stored as canonical JSON strings so that replay sees
/// byte-identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub campaign_id: String,
    pub turn_no: i64,
    pub player_input: String,
    pub context_packet_json: String,
    pub pass_outputs_json: String,
    pub engine_events_json: String,
    pub state_diff_json: String,
    pub final_text: String,
    pub prompt_versions_json: String,
    #[serde(default)]
    pub created_at: String,
}

impl EventRecord {
    /// Decode the stored engine events; malformed history decodes to empty.
    pub fn engine_events(&self) -> Vec<crate::EngineEvent> {
        serde_json::from_str(&self.engine_events_json).unwrap_or_default()
    }

    /// Decode the stored state diff.
    pub fn state_diff(&self) -> serde_json::Result<crate::StateDiff> {
        serde_json::from_str(&self.state_diff_json)
    }
}
