use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Dice mechanic selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceMethod {
    #[serde(rename = "2d6_bands")]
    Bands2d6,
    #[serde(rename = "dice_pool")]
    DicePool,
}

impl Default for DiceMethod {
    fn default() -> Self {
        DiceMethod::Bands2d6
    }
}

/// Net-success thresholds for pool outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolThresholds {
    #[serde(default)]
    pub botch: u32,
    #[serde(default)]
    pub failure: u32,
    #[serde(default = "default_mixed")]
    pub mixed: u32,
    #[serde(default = "default_success")]
    pub success: u32,
    #[serde(default = "default_critical")]
    pub critical: u32,
}

fn default_mixed() -> u32 {
    1
}
fn default_success() -> u32 {
    2
}
fn default_critical() -> u32 {
    4
}

impl Default for PoolThresholds {
    fn default() -> Self {
        Self {
            botch: 0,
            failure: 0,
            mixed: 1,
            success: 2,
            critical: 4,
        }
    }
}

/// 2d6 band boundaries, inclusive ranges keyed by outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bands {
    #[serde(default = "default_failure_band")]
    pub failure: [i64; 2],
    #[serde(default = "default_mixed_band")]
    pub mixed: [i64; 2],
    #[serde(default = "default_success_band")]
    pub success: [i64; 2],
    #[serde(default = "default_critical_band")]
    pub critical: [i64; 2],
}

fn default_failure_band() -> [i64; 2] {
    [2, 6]
}
fn default_mixed_band() -> [i64; 2] {
    [7, 9]
}
fn default_success_band() -> [i64; 2] {
    [10, 11]
}
fn default_critical_band() -> [i64; 2] {
    [12, 12]
}

impl Default for Bands {
    fn default() -> Self {
        Self {
            failure: default_failure_band(),
            mixed: default_mixed_band(),
            success: default_success_band(),
            critical: default_critical_band(),
        }
    }
}

/// How dice resolution works for this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default)]
    pub method: DiceMethod,
    #[serde(default = "default_die_type")]
    pub die_type: u32,
    #[serde(default = "default_difficulty")]
    pub default_difficulty: u32,
    #[serde(default)]
    pub ones_cancel_successes: bool,
    #[serde(default)]
    pub botch_on_ones: bool,
    #[serde(default)]
    pub threshold_past_9: bool,
    #[serde(default)]
    pub pool_outcome_thresholds: PoolThresholds,
    #[serde(default)]
    pub bands: Bands,
}

fn default_die_type() -> u32 {
    6
}
fn default_difficulty() -> u32 {
    6
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            method: DiceMethod::Bands2d6,
            die_type: 6,
            default_difficulty: 6,
            ones_cancel_successes: false,
            botch_on_ones: false,
            threshold_past_9: false,
            pool_outcome_thresholds: PoolThresholds::default(),
            bands: Bands::default(),
        }
    }
}

/// What stats exist in this system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSchema {
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub abilities: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub special_traits: BTreeMap<String, Value>,
}

impl StatSchema {
    /// Flat list of all attribute names across categories.
    pub fn all_attribute_names(&self) -> Vec<String> {
        self.attributes.values().flatten().cloned().collect()
    }

    /// Flat list of all ability names across categories.
    pub fn all_ability_names(&self) -> Vec<String> {
        self.abilities.values().flatten().cloned().collect()
    }
}

/// Difficulty settings for the resolution system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    #[serde(default = "default_difficulty")]
    pub default: u32,
    #[serde(default)]
    pub auto_success_if_pool_gte_difficulty: bool,
    #[serde(default)]
    pub retry_penalty: u32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            default: 6,
            auto_success_if_pool_gte_difficulty: false,
            retry_penalty: 0,
        }
    }
}

/// Willpower/resource spending rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillpowerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_resource_name")]
    pub resource_name: String,
    #[serde(default = "default_one")]
    pub auto_successes_per_spend: u32,
    #[serde(default = "default_one")]
    pub max_per_turn: u32,
}

fn default_resource_name() -> String {
    "willpower".to_string()
}
fn default_one() -> u32 {
    1
}

impl Default for WillpowerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            resource_name: default_resource_name(),
            auto_successes_per_spend: 1,
            max_per_turn: 1,
        }
    }
}

/// (attribute, ability) pair backing an action's dice pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatPair {
    pub attribute: String,
    pub ability: String,
}

/// Complete resolution-system configuration.
///
/// With no `resolution_rules` in the campaign record this is the default
/// 2d6 band system; existing campaigns work with zero changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // Empty when the rules blob carries no name; the loader derives one.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub stat_schema: StatSchema,
    #[serde(default)]
    pub difficulty: DifficultyConfig,
    #[serde(default)]
    pub willpower: WillpowerConfig,
    #[serde(default)]
    pub action_stat_map: BTreeMap<String, StatPair>,
    #[serde(default)]
    pub condition_map: BTreeMap<String, String>,
    #[serde(default)]
    pub clear_map: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub safe_actions: BTreeSet<String>,
    #[serde(default)]
    pub risky_actions: BTreeSet<String>,
    #[serde(default)]
    pub inventory_requirements: BTreeMap<String, BTreeMap<String, i64>>,
}

fn default_system_name() -> String {
    "default_2d6".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: default_system_name(),
            resolution: ResolutionConfig::default(),
            stat_schema: StatSchema::default(),
            difficulty: DifficultyConfig::default(),
            willpower: WillpowerConfig::default(),
            action_stat_map: BTreeMap::new(),
            condition_map: BTreeMap::new(),
            clear_map: BTreeMap::new(),
            safe_actions: BTreeSet::new(),
            risky_actions: BTreeSet::new(),
            inventory_requirements: BTreeMap::new(),
        }
    }
}

impl SystemConfig {
    /// (attribute, ability) for an action type. Falls back to the `_default`
    /// entry, then to ("wits", "alertness").
    pub fn stat_pair(&self, action_type: &str) -> (String, String) {
        let entry = self
            .action_stat_map
            .get(&action_type.to_lowercase())
            .or_else(|| self.action_stat_map.get("_default"));
        match entry {
            Some(pair) => (pair.attribute.clone(), pair.ability.clone()),
            None => ("wits".to_string(), "alertness".to_string()),
        }
    }

    pub fn is_dice_pool(&self) -> bool {
        self.resolution.method == DiceMethod::DicePool
    }

    /// Human-readable summary for LLM context.
    pub fn system_summary(&self) -> Value {
        if self.is_dice_pool() {
            json!({
                "name": self.name,
                "resolution": format!(
                    "Dice pool: roll (attribute + ability) d{}s, count successes >= difficulty (default {})",
                    self.resolution.die_type, self.difficulty.default
                ),
                "ones_cancel": self.resolution.ones_cancel_successes,
                "botch_possible": self.resolution.botch_on_ones,
                "willpower": self.willpower.enabled,
            })
        } else {
            json!({
                "name": self.name,
                "resolution": "2d6 sum against bands: 6- fail, 7-9 mixed, 10+ success, 12 critical",
                "ones_cancel": false,
                "botch_possible": false,
                "willpower": false,
            })
        }
    }
}

/// Load the resolution-system configuration from a campaign's system config
/// blob. Returns the default 2d6 config when there are no `resolution_rules`.
pub fn load_system_config(system_json: &Value) -> SystemConfig {
    let Some(rules) = system_json.get("resolution_rules") else {
        return SystemConfig::default();
    };
    if !rules.is_object() || rules.as_object().is_some_and(|o| o.is_empty()) {
        return SystemConfig::default();
    }
    let mut config: SystemConfig = serde_json::from_value(rules.clone()).unwrap_or_default();
    if config.name.is_empty() {
        config.name = if config.is_dice_pool() {
            "dice_pool".to_string()
        } else {
            "default_2d6".to_string()
        };
    }
    config
}

/// Full `resolution_rules` blob for a Mage: The Ascension style pool system.
/// Campaigns put this under `system_json.resolution_rules`.
pub fn mage_ascension_resolution_rules() -> Value {
    json!({
        "name": "mage_ascension",
        "resolution": {
            "method": "dice_pool",
            "die_type": 10,
            "default_difficulty": 6,
            "ones_cancel_successes": true,
            "botch_on_ones": true,
            "threshold_past_9": true,
            "pool_outcome_thresholds": {
                "botch": 0,
                "failure": 0,
                "mixed": 1,
                "success": 2,
                "critical": 4,
            },
        },
        "stat_schema": {
            "attributes": {
                "physical": ["strength", "dexterity", "stamina"],
                "social": ["charisma", "manipulation", "appearance"],
                "mental": ["perception", "intelligence", "wits"],
            },
            "abilities": {
                "talents": [
                    "alertness", "athletics", "awareness", "brawl",
                    "expression", "intimidation", "leadership",
                    "streetwise", "subterfuge",
                ],
                "skills": [
                    "crafts", "drive", "etiquette", "firearms",
                    "martial_arts", "meditation", "melee",
                    "stealth", "survival", "technology",
                ],
                "knowledges": [
                    "academics", "computer", "cosmology", "enigmas",
                    "investigation", "law", "linguistics",
                    "medicine", "occult", "science",
                ],
            },
            "special_traits": {
                "arete": {"min": 1, "max": 10},
                "willpower": {"min": 1, "max": 10},
                "quintessence": {"min": 0, "max": 20},
                "paradox": {"min": 0, "max": 20},
            },
        },
        "action_stat_map": {
            "sneak": {"attribute": "dexterity", "ability": "stealth"},
            "hide": {"attribute": "dexterity", "ability": "stealth"},
            "attack": {"attribute": "strength", "ability": "brawl"},
            "fight": {"attribute": "strength", "ability": "brawl"},
            "shoot": {"attribute": "dexterity", "ability": "firearms"},
            "climb": {"attribute": "dexterity", "ability": "athletics"},
            "chase": {"attribute": "dexterity", "ability": "athletics"},
            "flee": {"attribute": "dexterity", "ability": "athletics"},
            "persuade": {"attribute": "charisma", "ability": "expression"},
            "intimidate": {"attribute": "strength", "ability": "intimidation"},
            "deceive": {"attribute": "manipulation", "ability": "subterfuge"},
            "negotiate": {"attribute": "charisma", "ability": "expression"},
            "hack": {"attribute": "intelligence", "ability": "computer"},
            "steal": {"attribute": "dexterity", "ability": "subterfuge"},
            "investigate": {"attribute": "perception", "ability": "investigation"},
            "search": {"attribute": "perception", "ability": "awareness"},
            "examine": {"attribute": "perception", "ability": "awareness"},
            "_default": {"attribute": "wits", "ability": "alertness"},
        },
        "difficulty": {
            "default": 6,
            "auto_success_if_pool_gte_difficulty": false,
            "retry_penalty": 1,
        },
        "willpower": {
            "enabled": true,
            "resource_name": "willpower",
            "auto_successes_per_spend": 1,
            "max_per_turn": 1,
        },
    })
}
