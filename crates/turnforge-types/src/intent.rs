use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One verb-object pair extracted from player input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub action: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i64>,
}

impl ProposedAction {
    pub fn new(action: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target_id: target_id.into(),
            details: String::new(),
            estimated_minutes: None,
        }
    }
}

/// Interpreter's note that the player referenced something they may not
/// actually perceive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionFlag {
    pub entity_id: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub player_assumption: String,
}

/// Structured intent extracted from free-text player input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpreterOutput {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub referenced_entities: Vec<String>,
    #[serde(default)]
    pub proposed_actions: Vec<ProposedAction>,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default)]
    pub perception_flags: Vec<PerceptionFlag>,
}

/// Why the validator rejected an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    UnknownEntity,
    NotPerceivable,
    NotPresent,
    MissingItem,
    Contradiction,
}

impl BlockReason {
    /// Blocks that stem from the player referencing something they cannot
    /// see; these are what trigger a clarification question.
    pub fn is_perception_class(&self) -> bool {
        matches!(
            self,
            BlockReason::UnknownEntity | BlockReason::NotPerceivable | BlockReason::NotPresent
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedAction {
    pub action: String,
    pub target_id: String,
    pub reason: BlockReason,
    pub message: String,
}

/// Validator stage output: what survived, what was blocked, what it costs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorOutput {
    pub allowed_actions: Vec<ProposedAction>,
    pub blocked_actions: Vec<BlockedAction>,
    pub clarification_needed: bool,
    #[serde(default)]
    pub clarification_question: String,
    #[serde(default)]
    pub costs: BTreeMap<String, i64>,
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

/// Planner stage output. Only `tension_move` feeds resolution; the rest is
/// narrator guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerOutput {
    #[serde(default)]
    pub beats: Vec<Value>,
    #[serde(default)]
    pub tension_move: String,
    #[serde(default)]
    pub clarification_question: String,
    #[serde(default)]
    pub next_suggestions: Vec<String>,
}

/// Narrator stage output: the prose the player reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarratorOutput {
    pub final_text: String,
    #[serde(default)]
    pub next_prompt: String,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
}

/// All four pass outputs, serialized together into the event record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassOutputs {
    pub interpreter: InterpreterOutput,
    pub validator: ValidatorOutput,
    pub planner: PlannerOutput,
    pub narrator: NarratorOutput,
}
