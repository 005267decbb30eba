use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Clock, EngineEvent, Entity, Fact, InventoryRow, Scene, SituationSeverity, Thread};

/// How dangerous an NPC is to the player right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl ThreatLevel {
    /// Priority used to pick the primary threat (extreme first).
    pub fn rank(&self) -> u8 {
        match self {
            ThreatLevel::Low => 1,
            ThreatLevel::Moderate => 2,
            ThreatLevel::High => 3,
            ThreatLevel::Extreme => 4,
        }
    }

    pub fn is_active_threat(&self) -> bool {
        matches!(self, ThreatLevel::High | ThreatLevel::Extreme)
    }
}

impl Default for ThreatLevel {
    fn default() -> Self {
        ThreatLevel::Low
    }
}

/// How an NPC escalates against the player at each pressure stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscalationProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard: Option<String>,
}

/// What an NPC in scene can bring to bear, derived from its attrs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcCapability {
    pub entity_id: String,
    pub name: String,
    #[serde(default)]
    pub threat_level: ThreatLevel,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
    #[serde(default)]
    pub escalation_profile: EscalationProfile,
}

/// A situation fact currently weighing on the player, flattened for the
/// pipeline (the owning fact id rides along for updates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSituation {
    pub fact_id: String,
    pub condition: String,
    pub severity: SituationSeverity,
    #[serde(default)]
    pub source_action: String,
    #[serde(default)]
    pub clears_on: Vec<String>,
    #[serde(default)]
    pub narrative_hint: String,
}

/// A declared-but-unresolved GM threat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingThreat {
    pub fact_id: String,
    pub description: String,
    #[serde(default)]
    pub turn_declared: i64,
    #[serde(default)]
    pub severity: String,
}

/// Run of consecutive fully-failed turns, reconstructed at context build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureStreak {
    pub count: u32,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub during_threat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lethality {
    Low,
    Moderate,
    Brutal,
}

impl Default for Lethality {
    fn default() -> Self {
        Lethality::Moderate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    Forgiving,
    Consequential,
    Punishing,
}

impl Default for FailureMode {
    fn default() -> Self {
        FailureMode::Consequential
    }
}

/// Campaign risk dials applied to costs and failure effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSettings {
    #[serde(default)]
    pub lethality: Lethality,
    #[serde(default)]
    pub failure_mode: FailureMode,
}

/// Campaign calibration: tone and theme blobs stay free-form, risk is typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default)]
    pub tone: Value,
    #[serde(default)]
    pub themes: Value,
    #[serde(default)]
    pub risk: RiskSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    #[serde(default)]
    pub scene: String,
    #[serde(default)]
    pub threads: String,
}

/// One prior turn, as much of it as downstream prompts need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEvent {
    pub turn_no: i64,
    pub player_input: String,
    pub final_text: String,
    #[serde(default)]
    pub engine_events: Vec<EngineEvent>,
}

/// The immutable, perception-filtered view of the world handed to every
/// downstream pipeline stage for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPacket {
    pub scene: Scene,
    pub present_entities: Vec<String>,
    pub entities: Vec<Entity>,
    pub facts: Vec<Fact>,
    pub threads: Vec<Thread>,
    pub clocks: Vec<Clock>,
    pub inventory: Vec<InventoryRow>,
    #[serde(default)]
    pub summary: ContextSummary,
    #[serde(default)]
    pub recent_events: Vec<RecentEvent>,
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub genre_rules: Value,
    /// Raw campaign system config blob; the engine parses clock and
    /// resolution rules out of it.
    #[serde(default)]
    pub system: Value,
    #[serde(default)]
    pub active_situations: Vec<ActiveSituation>,
    #[serde(default)]
    pub npc_capabilities: Vec<NpcCapability>,
    #[serde(default)]
    pub pending_threats: Vec<PendingThreat>,
    #[serde(default)]
    pub failure_streak: FailureStreak,
    #[serde(default)]
    pub lore_context: Vec<Value>,
}

impl ContextPacket {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn is_present(&self, id: &str) -> bool {
        self.present_entities.iter().any(|e| e == id)
    }

    pub fn facts_for_subject<'a>(
        &'a self,
        subject_id: &'a str,
    ) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts.iter().filter(move |f| f.subject_id == subject_id)
    }

    pub fn inventory_for<'a>(
        &'a self,
        owner_id: &'a str,
    ) -> impl Iterator<Item = &'a InventoryRow> + 'a {
        self.inventory.iter().filter(move |i| i.owner_id == owner_id)
    }
}

/// Knobs for context assembly. Defaults give the player-facing view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextOptions {
    /// Include `world`-visibility facts (introspection tooling only; the
    /// turn pipeline never sets this).
    pub include_world_facts: bool,
    pub include_obscured: bool,
    pub max_entities: Option<usize>,
    pub max_facts: Option<usize>,
}

/// Why an entity is (not) perceivable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionIssue {
    NotPresent,
    NotKnown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionClarity {
    Clear,
    Obscured,
}

/// Answer to "can the player currently perceive entity X?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPerception {
    pub perceivable: bool,
    pub clarity: PerceptionClarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<PerceptionIssue>,
}
