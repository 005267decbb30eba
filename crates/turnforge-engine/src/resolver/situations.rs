use turnforge_types::{
    new_situation_id, ContextPacket, EngineEvent, FactAdd, FactUpdate, Outcome,
    SituationClearedDetails, SituationCreatedDetails, SituationObject, SituationSeverity,
    StateDiff, Visibility, SITUATION_PREDICATE,
};

use super::describe_failure_state;
use super::PLAYER_ID;
use crate::SystemConfig;

/// The situation condition a failed action of this type creates, if any.
/// Campaigns can override the mapping through their resolution rules.
pub fn condition_for_action(action_type: &str, system_config: &SystemConfig) -> Option<String> {
    let action = action_type.to_lowercase();
    if !system_config.condition_map.is_empty() {
        return system_config.condition_map.get(&action).cloned();
    }
    let condition = match action.as_str() {
        "sneak" | "hide" | "climb" => "exposed",
        "steal" | "hack" | "deceive" => "detected",
        "flee" => "cornered",
        "chase" => "pursued",
        "fight" | "attack" | "combat" => "injured",
        _ => return None,
    };
    Some(condition.to_string())
}

/// Which success keys clear a condition.
pub fn clear_conditions_for(condition: &str, system_config: &SystemConfig) -> Vec<String> {
    if !system_config.clear_map.is_empty() {
        return system_config
            .clear_map
            .get(condition)
            .cloned()
            .unwrap_or_default();
    }
    let clears: &[&str] = match condition {
        "exposed" => &["hide_success", "flee_success", "scene_change"],
        "detected" => &["scene_change", "deceive_success"],
        "cornered" => &["fight_success", "talk_success", "scene_change"],
        "injured" => &["rest_success", "medical_success"],
        "pursued" => &["flee_success", "hide_success", "fight_success"],
        _ => &[],
    };
    clears.iter().map(|s| s.to_string()).collect()
}

/// Create a situation fact for a failed action, or upgrade an existing one
/// from soft to hard. Exactly one active row exists per (subject,
/// condition); a repeat failure at the same or lower severity is a no-op.
pub(super) fn create_or_upgrade_situation(
    action_type: &str,
    target_id: &str,
    severity_tier: u8,
    ctx: &ContextPacket,
    system_config: &SystemConfig,
    diff: &mut StateDiff,
) -> Vec<EngineEvent> {
    let Some(condition) = condition_for_action(action_type, system_config) else {
        return Vec::new();
    };
    let severity = if severity_tier >= 2 {
        SituationSeverity::Hard
    } else {
        SituationSeverity::Soft
    };
    let clears_on = clear_conditions_for(&condition, system_config);
    let mut events = Vec::new();

    if let Some(existing) = ctx
        .active_situations
        .iter()
        .find(|sit| sit.condition == condition)
    {
        if existing.severity == SituationSeverity::Soft && severity == SituationSeverity::Hard {
            let hint = format!(
                "Situation worsened - player's {} failure escalated exposure",
                action_type
            );
            let upgraded = SituationObject::new(
                condition.clone(),
                action_type,
                SituationSeverity::Hard,
                clears_on,
                hint.clone(),
            );
            diff.facts_update.push(FactUpdate {
                id: existing.fact_id.clone(),
                object: Some(upgraded.to_value()),
                visibility: None,
            });
            events.push(EngineEvent::SituationCreated {
                details: SituationCreatedDetails {
                    condition,
                    severity: SituationSeverity::Hard,
                    upgraded_from: Some(SituationSeverity::Soft),
                    source_action: action_type.to_string(),
                    narrative_hint: hint,
                },
                tags: vec!["situation".to_string(), "escalation".to_string()],
            });
        }
        // Same or higher severity already active: no duplicate row.
        return events;
    }

    let narrative_hint = describe_failure_state(action_type, target_id);
    let object = SituationObject::new(
        condition.clone(),
        action_type,
        severity,
        clears_on,
        narrative_hint.clone(),
    );
    diff.facts_add.push(FactAdd {
        id: Some(new_situation_id()),
        subject_id: PLAYER_ID.to_string(),
        predicate: SITUATION_PREDICATE.to_string(),
        object: object.to_value(),
        visibility: Visibility::Known,
        tags: vec!["situation".to_string(), "active".to_string()],
    });
    events.push(EngineEvent::SituationCreated {
        details: SituationCreatedDetails {
            condition,
            severity,
            upgraded_from: None,
            source_action: action_type.to_string(),
            narrative_hint,
        },
        tags: vec!["situation".to_string()],
    });

    events
}

/// On success (or partial success), deactivate every active situation whose
/// `clears_on` lists this action's success key.
pub(super) fn clear_resolved_situations(
    action_type: &str,
    outcome: Outcome,
    ctx: &ContextPacket,
    diff: &mut StateDiff,
) -> Vec<EngineEvent> {
    let success_key = format!("{}_success", action_type.to_lowercase());
    let outcome_key = match outcome {
        Outcome::Critical => "critical",
        Outcome::Success => "success",
        Outcome::Mixed => "mixed",
        Outcome::Failure => "failure",
        Outcome::Botch => "botch",
    };
    let mut events = Vec::new();

    for sit in &ctx.active_situations {
        if !sit.clears_on.iter().any(|key| key == &success_key) {
            continue;
        }
        let cleared = SituationObject {
            condition: sit.condition.clone(),
            active: false,
            source_action: sit.source_action.clone(),
            severity: sit.severity,
            clears_on: sit.clears_on.clone(),
            narrative_hint: sit.narrative_hint.clone(),
        };
        diff.facts_update.push(FactUpdate {
            id: sit.fact_id.clone(),
            object: Some(cleared.to_value()),
            visibility: None,
        });
        events.push(EngineEvent::SituationCleared {
            details: SituationClearedDetails {
                condition: sit.condition.clone(),
                cleared_by: format!("{}_{}", action_type.to_lowercase(), outcome_key),
                fact_id: sit.fact_id.clone(),
            },
            tags: vec!["situation".to_string(), "resolved".to_string()],
        });
    }

    events
}
