use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A bounded progress track with scripted threshold effects.
///
/// Invariant: `0 <= value <= max`; the store clamps on every update.
/// Trigger keys are stringified thresholds; a trigger fires when `value`
/// crosses its threshold upward in a single update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    pub id: String,
    pub name: String,
    pub value: i64,
    pub max: i64,
    #[serde(default)]
    pub triggers: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Clock {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: i64, max: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            max,
            triggers: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Effects whose thresholds lie in `(old_value, new_value]`.
    pub fn crossed_triggers(&self, old_value: i64, new_value: i64) -> Vec<String> {
        self.triggers
            .iter()
            .filter_map(|(threshold, effect)| {
                let threshold: i64 = threshold.parse().ok()?;
                (old_value < threshold && new_value >= threshold).then(|| effect.clone())
            })
            .collect()
    }
}
