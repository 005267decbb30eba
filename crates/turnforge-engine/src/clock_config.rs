use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use turnforge_types::FailureMode;

/// Which way a clock moves when something is "spent" on it.
///
/// Decrementing clocks tick down (time remaining); all upstream logic still
/// reasons in positive deltas and only [`ClockConfig::apply_direction`]
/// understands the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increment,
    Decrement,
}

/// One configured clock effect: advance `id` by `delta` (pre-direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockEffect {
    pub id: String,
    pub delta: i64,
}

/// Streak and tier tuning for the failure-severity subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSeverityConfig {
    #[serde(default = "default_streak_threshold")]
    pub streak_threshold: u32,
    #[serde(default = "default_tier2_harm_actions")]
    pub tier2_harm_actions: Vec<String>,
    #[serde(default = "default_tier3_base_harm")]
    pub tier3_base_harm: i64,
}

fn default_streak_threshold() -> u32 {
    3
}

fn default_tier2_harm_actions() -> Vec<String> {
    ["sneak", "hide", "flee", "climb", "fight", "attack", "chase"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_tier3_base_harm() -> i64 {
    2
}

impl Default for FailureSeverityConfig {
    fn default() -> Self {
        Self {
            streak_threshold: default_streak_threshold(),
            tier2_harm_actions: default_tier2_harm_actions(),
            tier3_base_harm: default_tier3_base_harm(),
        }
    }
}

/// Resolved clock configuration for a campaign.
///
/// With no `clock_rules` in the campaign's system config this is the empty
/// config: no clocks, no costs, no effects. Campaigns opt in by data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub clocks_enabled: Vec<String>,
    #[serde(default)]
    pub direction: BTreeMap<String, Direction>,
    #[serde(default)]
    pub cost_map: BTreeMap<String, BTreeMap<String, i64>>,
    #[serde(default)]
    pub complication_clocks: BTreeMap<String, Vec<ClockEffect>>,
    #[serde(default)]
    pub failure_effects: BTreeMap<String, BTreeMap<String, Vec<ClockEffect>>>,
    #[serde(default)]
    pub tension_keywords: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_true")]
    pub show_deltas: bool,
    #[serde(default)]
    pub duration_map: BTreeMap<String, i64>,
    #[serde(default)]
    pub failure_severity: FailureSeverityConfig,
}

fn default_true() -> bool {
    true
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clocks_enabled: Vec::new(),
            direction: BTreeMap::new(),
            cost_map: BTreeMap::new(),
            complication_clocks: BTreeMap::new(),
            failure_effects: BTreeMap::new(),
            tension_keywords: BTreeMap::new(),
            show_deltas: true,
            duration_map: BTreeMap::new(),
            failure_severity: FailureSeverityConfig::default(),
        }
    }
}

impl ClockConfig {
    /// Default fictional duration in minutes. Falls back to `_default`, then 5.
    pub fn default_duration(&self, action_type: &str) -> i64 {
        self.duration_map
            .get(action_type)
            .or_else(|| self.duration_map.get("_default"))
            .copied()
            .unwrap_or(5)
    }

    /// Cost for an action type, filtered to active clocks.
    ///
    /// Uses the `_default` entry for unlisted actions; empty when neither
    /// exists.
    pub fn cost_for(&self, action_type: &str) -> BTreeMap<String, i64> {
        let raw = self
            .cost_map
            .get(action_type)
            .or_else(|| self.cost_map.get("_default"));
        match raw {
            Some(costs) => costs
                .iter()
                .filter(|(clock, _)| self.is_clock_active(clock))
                .map(|(clock, delta)| (clock.clone(), *delta))
                .collect(),
            None => BTreeMap::new(),
        }
    }

    /// Apply direction to a delta. Decrementing clocks get negated.
    pub fn apply_direction(&self, clock_id: &str, delta: i64) -> i64 {
        if self.direction.get(clock_id) == Some(&Direction::Decrement) {
            -delta.abs()
        } else {
            delta
        }
    }

    pub fn is_clock_active(&self, clock_id: &str) -> bool {
        self.clocks_enabled.iter().any(|c| c == clock_id)
    }

    /// Clock effects for a complication (mixed result), filtered to active
    /// clocks. Category is `combat` for combat-type actions, else `default`.
    pub fn complication_effects(&self, action_type: &str) -> Vec<ClockEffect> {
        let category = if matches!(action_type.to_lowercase().as_str(), "combat" | "attack" | "violence")
        {
            "combat"
        } else {
            "default"
        };
        let effects = self
            .complication_clocks
            .get(category)
            .or_else(|| self.complication_clocks.get("default"));
        self.active_only(effects)
    }

    /// Clock effects for a failure under the given failure mode, filtered to
    /// active clocks. Unknown modes fall back to `consequential`.
    pub fn failure_clock_effects(&self, action_type: &str, mode: FailureMode) -> Vec<ClockEffect> {
        let mode_key = match mode {
            FailureMode::Forgiving => "forgiving",
            FailureMode::Consequential => "consequential",
            FailureMode::Punishing => "punishing",
        };
        let Some(mode_effects) = self
            .failure_effects
            .get(mode_key)
            .or_else(|| self.failure_effects.get("consequential"))
        else {
            return Vec::new();
        };
        let category =
            if matches!(action_type.to_lowercase().as_str(), "combat" | "attack" | "fight" | "shoot") {
                "combat"
            } else {
                "default"
            };
        let effects = mode_effects
            .get(category)
            .or_else(|| mode_effects.get("default"));
        self.active_only(effects)
    }

    /// Match tension move text to a clock id via configured keywords.
    pub fn tension_clock(&self, tension_text: &str) -> Option<&str> {
        let text = tension_text.to_lowercase();
        self.tension_keywords
            .iter()
            .find(|(clock_id, keywords)| {
                self.is_clock_active(clock_id) && keywords.iter().any(|kw| text.contains(kw.as_str()))
            })
            .map(|(clock_id, _)| clock_id.as_str())
    }

    fn active_only(&self, effects: Option<&Vec<ClockEffect>>) -> Vec<ClockEffect> {
        effects
            .map(|list| {
                list.iter()
                    .filter(|e| self.is_clock_active(&e.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Load the clock configuration from a campaign's system config blob.
///
/// Returns the empty config when the blob has no `clock_rules`.
pub fn load_clock_config(system_json: &Value) -> ClockConfig {
    let Some(rules) = system_json.get("clock_rules") else {
        return ClockConfig::default();
    };
    if !rules.is_object() {
        return ClockConfig::default();
    }
    let mut config: ClockConfig =
        serde_json::from_value(rules.clone()).unwrap_or_default();
    if let Some(show) = rules
        .get("display")
        .and_then(|d| d.get("show_deltas"))
        .and_then(Value::as_bool)
    {
        config.show_deltas = show;
    }
    config
}

/// Full `clock_rules` blob for the cyberpunk noir genre. Campaigns reference
/// this or define their own; it lives under `system_json.clock_rules`.
pub fn cyberpunk_noir_clock_rules() -> Value {
    json!({
        "enabled": true,
        "clocks_enabled": ["heat", "time", "cred", "harm", "rep"],
        "direction": {
            "time": "decrement",
        },
        "cost_map": {
            "_default": {},
            "investigate": {"time": 1},
            "search": {"time": 1},
            "examine": {},
            "talk": {"time": 1},
            "social": {"time": 1},
            "persuade": {"time": 1},
            "negotiate": {"time": 1},
            "travel": {"time": 2},
            "move": {},
            "go": {},
            "hack": {"heat": 1, "time": 1},
            "steal": {"heat": 2, "time": 1},
            "combat": {"heat": 1},
            "attack": {"heat": 1},
            "violence": {"heat": 1},
            "crime": {"heat": 2},
            "bribe": {"cred": 50},
            "buy": {"cred": 0},
            "sneak": {},
            "climb": {},
            "use": {},
            "look": {},
            "wait": {"time": 1},
        },
        "complication_clocks": {
            "combat": [{"id": "heat", "delta": 1}],
            "default": [{"id": "time", "delta": 1}],
        },
        "failure_effects": {
            "forgiving": {
                "default": [{"id": "time", "delta": 1}],
            },
            "consequential": {
                "combat": [{"id": "harm", "delta": 1}],
                "default": [{"id": "heat", "delta": 1}],
            },
            "punishing": {
                "combat": [{"id": "harm", "delta": 2}, {"id": "heat", "delta": 1}],
                "default": [{"id": "heat", "delta": 1}],
            },
        },
        "tension_keywords": {
            "heat": ["heat", "attention"],
            "time": ["time", "deadline"],
        },
        "duration_map": {
            "_default": 5,
            "look": 1, "examine": 1, "use": 2,
            "move": 2, "go": 2, "sneak": 5, "climb": 5,
            "talk": 10, "ask": 5, "persuade": 15, "negotiate": 15, "intimidate": 5,
            "search": 15, "investigate": 20, "hack": 15,
            "travel": 30,
            "combat": 5, "attack": 3,
            "steal": 10, "wait": 15, "read": 5,
        },
        "failure_severity": {
            "streak_threshold": 3,
            "tier2_harm_actions": ["sneak", "hide", "flee", "climb", "fight", "attack", "chase"],
            "tier3_base_harm": 2,
        },
        "display": {
            "show_deltas": true,
        },
    })
}
