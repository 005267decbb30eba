use turnforge_types::{
    ClockDelta, ContextPacket, DeltaSource, Discovery, FactAdd, FactUpdate, FailureMode,
    ProposedAction, RelationshipChange, StateDiff, Visibility,
};

use super::{WorldQuery, PLAYER_ID};
use crate::ClockConfig;

const INVESTIGATION_ACTIONS: [&str; 4] = ["investigate", "search", "examine", "hack"];
const SOCIAL_SUCCESS_ACTIONS: [&str; 4] = ["talk", "persuade", "help", "negotiate"];
const SOCIAL_FAILURE_ACTIONS: [&str; 5] =
    ["persuade", "intimidate", "deceive", "negotiate", "provoke"];
const STEALTH_ACTIONS: [&str; 3] = ["sneak", "hide", "steal"];

fn is_meta_target(target_id: &str) -> bool {
    matches!(target_id.to_lowercase().as_str(), "scene" | "self" | "player")
}

/// Effects of a full success: investigations record themselves as known
/// facts and reveal the target's hidden facts; social wins build trust.
pub(super) fn apply_success_effects(
    world: &dyn WorldQuery,
    action_type: &str,
    target_id: &str,
    action: &ProposedAction,
) -> StateDiff {
    let mut diff = StateDiff::default();

    if INVESTIGATION_ACTIONS.contains(&action_type) {
        diff.facts_add.push(FactAdd {
            id: None,
            subject_id: if target_id.is_empty() {
                "scene".to_string()
            } else {
                target_id.to_string()
            },
            predicate: "investigated_by_player".to_string(),
            object: serde_json::json!({
                "action": action_type,
                "details": action.details,
            }),
            visibility: Visibility::Known,
            tags: vec!["player_discovery".to_string()],
        });

        // Promote the target's hidden facts to known.
        if !target_id.is_empty() {
            for fact in world.facts_for_subject(target_id) {
                if fact.visibility == Visibility::World {
                    diff.facts_update.push(FactUpdate {
                        id: fact.id,
                        object: None,
                        visibility: Some(Visibility::Known),
                    });
                }
            }
        }
    }

    if SOCIAL_SUCCESS_ACTIONS.contains(&action_type)
        && !target_id.is_empty()
        && !is_meta_target(target_id)
    {
        diff.relationship_changes.push(RelationshipChange {
            a_id: PLAYER_ID.to_string(),
            b_id: target_id.to_string(),
            rel_type: "trust".to_string(),
            delta: 1,
        });
    }

    diff
}

/// Discoverable information about a search target, surfaced in the success
/// event so the narrator has concrete material.
pub(super) fn gather_search_discoveries(world: &dyn WorldQuery, target_id: &str) -> Vec<Discovery> {
    let mut discoveries = Vec::new();

    if let Some(entity) = world.entity(target_id) {
        for key in ["knowledge", "cause_of_death", "status", "description"] {
            if let Some(value) = entity.attrs.get(key) {
                discoveries.push(Discovery::Attribute {
                    key: key.to_string(),
                    detail: value.clone(),
                });
            }
        }
    }

    for fact in world.facts_for_subject(target_id) {
        if fact.visibility == Visibility::World {
            discoveries.push(Discovery::HiddenFact {
                predicate: fact.predicate,
                detail: fact.object,
            });
        }
    }

    for row in world.inventory_for(target_id) {
        if let Some(item) = world.entity(&row.item_id) {
            discoveries.push(Discovery::ItemFound {
                item_id: row.item_id.clone(),
                name: item.name.clone(),
                detail: item.attr_str("description").unwrap_or("").to_string(),
            });
        }
    }

    discoveries
}

/// Effects of a mixed success: everything a success gives, plus the
/// configured complication clocks (doubled in punishing mode).
pub(super) fn apply_mixed_effects(
    world: &dyn WorldQuery,
    action_type: &str,
    target_id: &str,
    action: &ProposedAction,
    ctx: &ContextPacket,
    clock_config: &ClockConfig,
) -> StateDiff {
    let mut diff = apply_success_effects(world, action_type, target_id, action);

    if !clock_config.enabled {
        return diff;
    }

    let multiplier = if ctx.calibration.risk.failure_mode == FailureMode::Punishing {
        2
    } else {
        1
    };
    for effect in clock_config.complication_effects(action_type) {
        diff.clocks.push(ClockDelta {
            id: effect.id.clone(),
            delta: clock_config.apply_direction(&effect.id, effect.delta * multiplier),
            source: DeltaSource::Complication,
        });
    }

    diff
}

/// Effects of a failed action, scaled by severity tier.
///
/// Tier 0: configured failure clocks only. Tier 2 adds harm for physical
/// actions and extra heat for stealth; failed social moves sour trust at
/// every tier.
pub(super) fn apply_failure_effects(
    action_type: &str,
    target_id: &str,
    ctx: &ContextPacket,
    clock_config: &ClockConfig,
    severity_tier: u8,
) -> StateDiff {
    let mut diff = StateDiff::default();

    if SOCIAL_FAILURE_ACTIONS.contains(&action_type)
        && !target_id.is_empty()
        && !is_meta_target(target_id)
    {
        diff.relationship_changes.push(RelationshipChange {
            a_id: PLAYER_ID.to_string(),
            b_id: target_id.to_string(),
            rel_type: "trust".to_string(),
            delta: -1,
        });
    }

    if !clock_config.enabled {
        return diff;
    }

    let failure_mode = ctx.calibration.risk.failure_mode;
    for effect in clock_config.failure_clock_effects(action_type, failure_mode) {
        diff.clocks.push(ClockDelta {
            id: effect.id.clone(),
            delta: clock_config.apply_direction(&effect.id, effect.delta),
            source: DeltaSource::Failure,
        });
    }

    if severity_tier >= 2 {
        let physical = clock_config
            .failure_severity
            .tier2_harm_actions
            .iter()
            .any(|a| a == action_type);
        if physical {
            let already_harmed = diff.clocks.iter().any(|c| c.id == "harm");
            if !already_harmed {
                diff.clocks.push(ClockDelta {
                    id: "harm".to_string(),
                    delta: 1,
                    source: DeltaSource::Failure,
                });
            }
        }

        if STEALTH_ACTIONS.contains(&action_type) {
            diff.clocks.push(ClockDelta {
                id: "heat".to_string(),
                delta: 1,
                source: DeltaSource::Failure,
            });
        }
    }

    diff
}
