use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who can perceive a fact.
///
/// `World` facts exist in the world but are not player-perceivable; the
/// transition world -> known is one-way in normal play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Known,
    World,
}

/// A subject/predicate/object statement about the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub subject_id: String,
    pub predicate: String,
    pub object: Value,
    pub visibility: Visibility,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_turn: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_method: Option<String>,
}

fn default_confidence() -> f64 {
    1.0
}

/// Predicate marking a fact as a situation record.
pub const SITUATION_PREDICATE: &str = "situation";

/// Predicate marking a fact as a pending GM threat.
pub const PENDING_THREAT_PREDICATE: &str = "pending_threat";

/// Severity of a situation fact.
///
/// The only transition API offered is [`SituationObject::upgraded`], which
/// goes soft -> hard; a downgrade is not expressible through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationSeverity {
    Soft,
    Hard,
}

/// The object payload of a situation fact: a persistent adverse state of
/// the player with explicit clearing conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationObject {
    pub condition: String,
    pub active: bool,
    pub source_action: String,
    pub severity: SituationSeverity,
    pub clears_on: Vec<String>,
    pub narrative_hint: String,
}

impl SituationObject {
    pub fn new(
        condition: impl Into<String>,
        source_action: impl Into<String>,
        severity: SituationSeverity,
        clears_on: Vec<String>,
        narrative_hint: impl Into<String>,
    ) -> Self {
        Self {
            condition: condition.into(),
            active: true,
            source_action: source_action.into(),
            severity,
            clears_on,
            narrative_hint: narrative_hint.into(),
        }
    }

    /// Escalate to hard severity, recording the action that caused it.
    pub fn upgraded(&self, source_action: impl Into<String>, narrative_hint: impl Into<String>) -> Self {
        Self {
            condition: self.condition.clone(),
            active: true,
            source_action: source_action.into(),
            severity: SituationSeverity::Hard,
            clears_on: self.clears_on.clone(),
            narrative_hint: narrative_hint.into(),
        }
    }

    /// Deactivate; the row stays in the store for history.
    pub fn cleared(&self) -> Self {
        Self {
            active: false,
            ..self.clone()
        }
    }

    /// Parse from a fact's object payload; None for malformed objects.
    pub fn parse(object: &Value) -> Option<Self> {
        serde_json::from_value(object.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
