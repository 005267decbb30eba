use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SituationSeverity;

/// Something an investigation turned up, surfaced to the narrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discovery {
    Attribute { key: String, detail: Value },
    HiddenFact { predicate: String, detail: Value },
    ItemFound { item_id: String, name: String, detail: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessDetails {
    pub action: String,
    pub target_id: String,
    pub description: String,
    pub critical: bool,
    pub outcome_state: String,
    pub estimated_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discoveries: Option<Vec<Discovery>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialDetails {
    pub action: String,
    pub target_id: String,
    pub description: String,
    pub complication: String,
    pub mixed_state: String,
    pub estimated_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetails {
    pub action: String,
    pub target_id: String,
    pub description: String,
    pub consequence: String,
    pub failure_state: String,
    pub estimated_minutes: i64,
    pub severity_tier: u8,
    #[serde(default)]
    pub botch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotchDetails {
    pub action: String,
    pub target_id: String,
    pub ones: u32,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationCreatedDetails {
    pub condition: String,
    pub severity: SituationSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded_from: Option<SituationSeverity>,
    pub source_action: String,
    pub narrative_hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationClearedDetails {
    pub condition: String,
    pub cleared_by: String,
    pub fact_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipChangedDetails {
    pub a_id: String,
    pub b_id: String,
    pub rel_type: String,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockAdvancedDetails {
    pub clock: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcActionDetails {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakWarningDetails {
    pub streak_count: u32,
    pub next_failure_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatResolutionDetails {
    pub threat_entity_id: String,
    pub threat_entity_name: String,
    pub consequence_type: String,
    pub consequence_description: String,
    pub harm_delta: i64,
    pub binding: bool,
}

/// A narratable effect the resolver produced for this turn.
///
/// Engine events are what the narrator renders and what replay inspects,
/// so the wire shape is part of the event record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    ActionSucceeded {
        details: SuccessDetails,
        tags: Vec<String>,
    },
    ActionPartial {
        details: PartialDetails,
        tags: Vec<String>,
    },
    ActionFailed {
        details: FailureDetails,
        tags: Vec<String>,
    },
    ActionBotched {
        details: BotchDetails,
        tags: Vec<String>,
    },
    SituationCreated {
        details: SituationCreatedDetails,
        tags: Vec<String>,
    },
    SituationCleared {
        details: SituationClearedDetails,
        tags: Vec<String>,
    },
    RelationshipChanged {
        details: RelationshipChangedDetails,
        tags: Vec<String>,
    },
    ClockAdvanced {
        details: ClockAdvancedDetails,
        tags: Vec<String>,
    },
    NpcAction {
        details: NpcActionDetails,
        tags: Vec<String>,
    },
    FailureStreakWarning {
        details: StreakWarningDetails,
        tags: Vec<String>,
    },
    ThreatResolvedAgainstPlayer {
        details: ThreatResolutionDetails,
        tags: Vec<String>,
    },
}

impl EngineEvent {
    /// Whether this event records a player action outcome, and which kind.
    ///
    /// Partial successes count as successes for streak purposes: the player
    /// got something, so the streak breaks.
    pub fn action_outcome(&self) -> Option<ActionOutcomeKind> {
        match self {
            EngineEvent::ActionSucceeded { .. } | EngineEvent::ActionPartial { .. } => {
                Some(ActionOutcomeKind::Success)
            }
            EngineEvent::ActionFailed { .. } => Some(ActionOutcomeKind::Failure),
            _ => None,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            EngineEvent::ActionSucceeded { tags, .. }
            | EngineEvent::ActionPartial { tags, .. }
            | EngineEvent::ActionFailed { tags, .. }
            | EngineEvent::ActionBotched { tags, .. }
            | EngineEvent::SituationCreated { tags, .. }
            | EngineEvent::SituationCleared { tags, .. }
            | EngineEvent::RelationshipChanged { tags, .. }
            | EngineEvent::ClockAdvanced { tags, .. }
            | EngineEvent::NpcAction { tags, .. }
            | EngineEvent::FailureStreakWarning { tags, .. }
            | EngineEvent::ThreatResolvedAgainstPlayer { tags, .. } => tags,
        }
    }
}

/// Success-or-failure classification of an action event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcomeKind {
    Success,
    Failure,
}
