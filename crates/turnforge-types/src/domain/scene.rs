use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named stretch of the fictional day, derived from the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Night,
    PreDawn,
    Dawn,
    Morning,
    Afternoon,
    Evening,
}

impl Period {
    /// Derive the period for an hour of day (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            0..=4 | 20..=23 => Period::Night,
            5 => Period::PreDawn,
            6..=7 => Period::Dawn,
            8..=11 => Period::Morning,
            12..=16 => Period::Afternoon,
            _ => Period::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Night => "night",
            Period::PreDawn => "pre_dawn",
            Period::Dawn => "dawn",
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
            Period::Evening => "evening",
        }
    }
}

/// Fictional clock-on-the-wall time for the current scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTime {
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

impl SceneTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour,
            minute,
            period: Period::from_hour(hour),
            weather: None,
        }
    }
}

/// The singleton scene record: where the action is and who is there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub location_id: String,
    pub present_entity_ids: Vec<String>,
    pub time: SceneTime,
    #[serde(default)]
    pub constraints: serde_json::Map<String, Value>,
    #[serde(default)]
    pub visibility_conditions: String,
    #[serde(default)]
    pub noise_level: String,
    #[serde(default)]
    pub obscured_entities: Vec<String>,
}

impl Scene {
    pub fn new(location_id: impl Into<String>, present_entity_ids: Vec<String>) -> Self {
        Self {
            location_id: location_id.into(),
            present_entity_ids,
            time: SceneTime::new(12, 0),
            constraints: serde_json::Map::new(),
            visibility_conditions: "normal".to_string(),
            noise_level: "normal".to_string(),
            obscured_entities: Vec::new(),
        }
    }

    /// True when the scene's constraints flag is set truthy.
    pub fn constraint_flag(&self, key: &str) -> bool {
        self.constraints
            .get(key)
            .map(|v| v.as_bool().unwrap_or(!v.is_null()))
            .unwrap_or(false)
    }
}
