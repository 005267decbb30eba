use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{ThreadStatus, Visibility};

/// Where a clock delta came from, for event-record forensics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaSource {
    Cost,
    Complication,
    Failure,
    Tension,
    ThreatResolution,
}

/// One adjustment to a named clock. Deltas are post-direction: a
/// decrementing clock's spend arrives here already negated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockDelta {
    pub id: String,
    pub delta: i64,
    pub source: DeltaSource,
}

/// A fact to insert. Omitted ids are assigned by the store at apply time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactAdd {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subject_id: String,
    pub predicate: String,
    pub object: Value,
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A partial update to an existing fact by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Quantity delta for an owner's item stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryChange {
    pub owner_id: String,
    pub item_id: String,
    pub delta: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ThreadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Intensity delta for a directed relationship; created at zero if absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipChange {
    pub a_id: String,
    pub b_id: String,
    pub rel_type: String,
    pub delta: i64,
}

/// The algebraic change-set a resolved turn wants applied to the store.
///
/// Diffs compose with [`StateDiff::merge`]: list sections append in order,
/// the scene map shallow-merges with the source overriding. The store
/// applies a diff atomically at commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDiff {
    #[serde(default)]
    pub clocks: Vec<ClockDelta>,
    #[serde(default)]
    pub facts_add: Vec<FactAdd>,
    #[serde(default)]
    pub facts_update: Vec<FactUpdate>,
    #[serde(default)]
    pub inventory_changes: Vec<InventoryChange>,
    #[serde(default)]
    pub scene_update: BTreeMap<String, Value>,
    #[serde(default)]
    pub threads_update: Vec<ThreadUpdate>,
    #[serde(default)]
    pub relationship_changes: Vec<RelationshipChange>,
}

impl StateDiff {
    /// Combine two diffs, consuming both. List sections append preserving
    /// order; `scene_update` keys from `source` override.
    pub fn merge(mut self, source: StateDiff) -> StateDiff {
        self.clocks.extend(source.clocks);
        self.facts_add.extend(source.facts_add);
        self.facts_update.extend(source.facts_update);
        self.inventory_changes.extend(source.inventory_changes);
        self.threads_update.extend(source.threads_update);
        self.relationship_changes.extend(source.relationship_changes);
        for (key, value) in source.scene_update {
            self.scene_update.insert(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
            && self.facts_add.is_empty()
            && self.facts_update.is_empty()
            && self.inventory_changes.is_empty()
            && self.scene_update.is_empty()
            && self.threads_update.is_empty()
            && self.relationship_changes.is_empty()
    }
}
