use turnforge_types::{
    new_situation_id, ActionOutcomeKind, ClockDelta, ContextPacket, DeltaSource, EngineEvent,
    FactAdd, NpcCapability, SituationObject, SituationSeverity, StateDiff, StreakWarningDetails,
    ThreatResolutionDetails, Visibility, SITUATION_PREDICATE,
};

use super::PLAYER_ID;
use crate::{has_active_threat, ClockConfig};

/// After all actions resolve: if every one failed, the streak grows. At
/// threshold - 1 with a live threat the player gets a warning; at the
/// threshold the threat resolves against them, bindingly.
pub(super) fn check_failure_streak(
    outcomes: &[ActionOutcomeKind],
    ctx: &ContextPacket,
    clock_config: &ClockConfig,
) -> (Vec<EngineEvent>, StateDiff) {
    let mut events = Vec::new();
    let mut diff = StateDiff::default();

    let all_failed = !outcomes.is_empty()
        && outcomes.iter().all(|o| *o == ActionOutcomeKind::Failure);
    if !all_failed {
        return (events, diff);
    }

    let new_count = ctx.failure_streak.count + 1;
    let threat_present = has_active_threat(ctx);
    let threshold = clock_config.failure_severity.streak_threshold;

    if new_count >= threshold && threat_present {
        let (resolve_events, resolve_diff) = resolve_threat_against_player(ctx, clock_config);
        events.extend(resolve_events);
        diff = diff.merge(resolve_diff);
    } else if new_count + 1 == threshold && threat_present {
        events.push(EngineEvent::FailureStreakWarning {
            details: StreakWarningDetails {
                streak_count: new_count,
                next_failure_critical: true,
            },
            tags: vec!["warning".to_string(), "escalation".to_string()],
        });
    }

    (events, diff)
}

fn primary_threat(ctx: &ContextPacket) -> Option<&NpcCapability> {
    ctx.npc_capabilities
        .iter()
        .max_by_key(|npc| npc.threat_level.rank())
}

/// The streak hit its threshold under an active threat: the fiction stops
/// being negotiable. The nastiest NPC in scene closes in, harm lands, and a
/// hard cornered situation takes hold.
fn resolve_threat_against_player(
    ctx: &ContextPacket,
    clock_config: &ClockConfig,
) -> (Vec<EngineEvent>, StateDiff) {
    let mut events = Vec::new();
    let mut diff = StateDiff::default();

    let threat = primary_threat(ctx);
    let npc_id = threat.map_or("unknown_threat", |n| n.entity_id.as_str());
    let npc_name = threat.map_or("the threat", |n| n.name.as_str());
    let consequence = threat
        .and_then(|n| n.escalation_profile.hard.clone())
        .unwrap_or_else(|| format!("{} has caught up with the player", npc_name));

    let base_harm = clock_config.failure_severity.tier3_base_harm;

    events.push(EngineEvent::ThreatResolvedAgainstPlayer {
        details: ThreatResolutionDetails {
            threat_entity_id: npc_id.to_string(),
            threat_entity_name: npc_name.to_string(),
            consequence_type: "capture".to_string(),
            consequence_description: consequence,
            harm_delta: base_harm,
            binding: true,
        },
        tags: vec![
            "threat_resolution".to_string(),
            "binding".to_string(),
            "critical".to_string(),
        ],
    });

    diff.clocks.push(ClockDelta {
        id: "harm".to_string(),
        delta: base_harm,
        source: DeltaSource::ThreatResolution,
    });

    let object = SituationObject::new(
        "cornered",
        "threat_resolution",
        SituationSeverity::Hard,
        vec![
            "fight_success".to_string(),
            "talk_success".to_string(),
            "scene_change".to_string(),
        ],
        format!(
            "{} has the player cornered - direct confrontation or surrender",
            npc_name
        ),
    );
    diff.facts_add.push(FactAdd {
        id: Some(new_situation_id()),
        subject_id: PLAYER_ID.to_string(),
        predicate: SITUATION_PREDICATE.to_string(),
        object: object.to_value(),
        visibility: Visibility::Known,
        tags: vec!["situation".to_string(), "active".to_string()],
    });

    (events, diff)
}
