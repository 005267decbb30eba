//! End-to-end resolver behavior: costs, dedup, outcome effects, tension
//! moves, and the concrete scenario set the engine guarantees.

mod common;

use std::collections::BTreeMap;

use serde_json::json;
use turnforge_engine::{ResolveOptions, Resolver};
use turnforge_types::{
    DeltaSource, EngineEvent, Fact, Outcome, PlannerOutput, ProposedAction, ValidatorOutput,
    Visibility,
};

use common::{combat_context, minimal_context, with_noir_clocks};

fn force_roll(total: i64) -> ResolveOptions {
    ResolveOptions {
        force_roll: Some(total),
        ..ResolveOptions::default()
    }
}

fn validator_output(actions: Vec<ProposedAction>, risk_flags: &[&str]) -> ValidatorOutput {
    ValidatorOutput {
        allowed_actions: actions,
        risk_flags: risk_flags.iter().map(|s| s.to_string()).collect(),
        ..ValidatorOutput::default()
    }
}

#[test]
fn test_safe_examine_no_roll() {
    let ctx = with_noir_clocks(minimal_context());
    let mut action = ProposedAction::new("examine", "scene");
    action.details = "I look around".to_string();

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![action], &[]),
        &PlannerOutput::default(),
        &ResolveOptions::default(),
    );

    assert!(result.rolls.is_empty());
    let succeeded: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::ActionSucceeded { details, .. } => Some(details),
            _ => None,
        })
        .collect();
    assert_eq!(succeeded.len(), 1);
    assert_eq!(succeeded[0].action, "examine");
    assert!(!succeeded[0].critical);
    assert!(result.state_diff.clocks.is_empty());
    assert_eq!(result.total_estimated_minutes, 1);
}

#[test]
fn test_forced_critical_attack() {
    let ctx = with_noir_clocks(combat_context());
    let mut costs = BTreeMap::new();
    costs.insert("heat".to_string(), 1);
    let validator = ValidatorOutput {
        allowed_actions: vec![ProposedAction::new("attack", "hostile_npc")],
        costs,
        risk_flags: vec!["violence".to_string()],
        ..ValidatorOutput::default()
    };

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator,
        &PlannerOutput::default(),
        &force_roll(12),
    );

    assert_eq!(result.rolls.len(), 1);
    assert_eq!(result.rolls[0].outcome, Outcome::Critical);
    assert_eq!(result.rolls[0].total, 12);

    let succeeded = result
        .engine_events
        .iter()
        .find_map(|e| match e {
            EngineEvent::ActionSucceeded { details, .. } => Some(details),
            _ => None,
        })
        .unwrap();
    assert!(succeeded.critical);

    let heat: i64 = result
        .state_diff
        .clocks
        .iter()
        .filter(|c| c.id == "heat")
        .map(|c| c.delta)
        .sum();
    assert!(heat >= 1);
}

#[test]
fn test_costs_applied_regardless_of_outcome() {
    let ctx = with_noir_clocks(minimal_context());
    let mut costs = BTreeMap::new();
    costs.insert("heat".to_string(), 2);
    costs.insert("time".to_string(), 1);
    let validator = ValidatorOutput {
        allowed_actions: vec![ProposedAction::new("steal", "test_location")],
        costs,
        risk_flags: vec![],
        ..ValidatorOutput::default()
    };

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator,
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let cost_deltas: Vec<_> = result
        .state_diff
        .clocks
        .iter()
        .filter(|c| c.source == DeltaSource::Cost)
        .collect();
    let heat = cost_deltas.iter().find(|c| c.id == "heat").unwrap();
    assert_eq!(heat.delta, 2);
    // "time" is a decrementing clock: positive spend arrives negated.
    let time = cost_deltas.iter().find(|c| c.id == "time").unwrap();
    assert_eq!(time.delta, -1);
}

#[test]
fn test_actions_deduplicated_and_capped_at_two() {
    let ctx = with_noir_clocks(minimal_context());
    let actions = vec![
        ProposedAction::new("examine", "scene"),
        ProposedAction::new("examine", "scene"),
        ProposedAction::new("look", "scene"),
        ProposedAction::new("wait", "scene"),
    ];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(actions, &[]),
        &PlannerOutput::default(),
        &ResolveOptions::default(),
    );

    let action_events = result
        .engine_events
        .iter()
        .filter(|e| matches!(e, EngineEvent::ActionSucceeded { .. }))
        .count();
    assert_eq!(action_events, 2);
}

#[test]
fn test_risk_flag_forces_roll_on_safe_action() {
    let ctx = with_noir_clocks(minimal_context());

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("talk", "scene")], &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(10),
    );
    assert_eq!(result.rolls.len(), 1);
}

#[test]
fn test_unknown_verb_defaults_to_roll() {
    let ctx = with_noir_clocks(minimal_context());

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("juggle", "scene")], &[]),
        &PlannerOutput::default(),
        &force_roll(8),
    );
    assert_eq!(result.rolls.len(), 1);
    assert_eq!(result.rolls[0].outcome, Outcome::Mixed);
}

#[test]
fn test_successful_investigation_reveals_hidden_facts() {
    let mut ctx = with_noir_clocks(minimal_context());
    ctx.present_entities.push("witness".to_string());
    ctx.entities
        .push(common::make_npc("witness", "Nervous Witness", "witness"));
    ctx.facts.push(Fact {
        id: "clue_1".to_string(),
        subject_id: "witness".to_string(),
        predicate: "knows".to_string(),
        object: json!({"what": "saw the killer"}),
        visibility: Visibility::World,
        confidence: 1.0,
        tags: vec!["clue".to_string()],
        discovered_turn: None,
        discovery_method: None,
    });

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("investigate", "witness")], &[]),
        &PlannerOutput::default(),
        &ResolveOptions::default(),
    );

    // The investigation records itself as a known fact.
    let recorded: Vec<_> = result
        .state_diff
        .facts_add
        .iter()
        .filter(|f| f.predicate == "investigated_by_player")
        .collect();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].subject_id, "witness");

    // The hidden fact is promoted to known.
    let reveals: Vec<_> = result
        .state_diff
        .facts_update
        .iter()
        .filter(|u| u.id == "clue_1")
        .collect();
    assert_eq!(reveals.len(), 1);
    assert_eq!(reveals[0].visibility, Some(Visibility::Known));

    // And surfaces as a discovery in the success event.
    let succeeded = result
        .engine_events
        .iter()
        .find_map(|e| match e {
            EngineEvent::ActionSucceeded { details, .. } => Some(details),
            _ => None,
        })
        .unwrap();
    assert!(succeeded.discoveries.is_some());
}

#[test]
fn test_social_success_builds_trust() {
    let ctx = with_noir_clocks(combat_context());

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("talk", "hostile_npc")], &[]),
        &PlannerOutput::default(),
        &ResolveOptions::default(),
    );

    let changes: Vec<_> = result.state_diff.relationship_changes.iter().collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].a_id, "player");
    assert_eq!(changes[0].b_id, "hostile_npc");
    assert_eq!(changes[0].delta, 1);

    let rel_events = result
        .engine_events
        .iter()
        .filter(|e| matches!(e, EngineEvent::RelationshipChanged { .. }))
        .count();
    assert_eq!(rel_events, 1);
}

#[test]
fn test_social_failure_sours_trust() {
    let ctx = with_noir_clocks(combat_context());

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("persuade", "hostile_npc")], &[]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let changes: Vec<_> = result.state_diff.relationship_changes.iter().collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].delta, -1);
}

#[test]
fn test_meta_target_gets_no_relationship_change() {
    let ctx = with_noir_clocks(minimal_context());

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("talk", "scene")], &[]),
        &PlannerOutput::default(),
        &ResolveOptions::default(),
    );
    assert!(result.state_diff.relationship_changes.is_empty());
}

#[test]
fn test_mixed_outcome_applies_complication_clocks() {
    let ctx = with_noir_clocks(combat_context());

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("attack", "hostile_npc")], &["violence"]),
        &PlannerOutput::default(),
        &force_roll(8),
    );

    let partial = result
        .engine_events
        .iter()
        .find_map(|e| match e {
            EngineEvent::ActionPartial { details, .. } => Some(details),
            _ => None,
        })
        .unwrap();
    assert!(!partial.complication.is_empty());

    let complication_heat: Vec<_> = result
        .state_diff
        .clocks
        .iter()
        .filter(|c| c.id == "heat" && c.source == DeltaSource::Complication)
        .collect();
    assert_eq!(complication_heat.len(), 1);
    assert_eq!(complication_heat[0].delta, 1);
}

#[test]
fn test_punishing_mode_doubles_complications() {
    let mut ctx = with_noir_clocks(combat_context());
    ctx.calibration.risk.failure_mode = turnforge_types::FailureMode::Punishing;

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("attack", "hostile_npc")], &["violence"]),
        &PlannerOutput::default(),
        &force_roll(8),
    );

    let complication_heat = result
        .state_diff
        .clocks
        .iter()
        .find(|c| c.id == "heat" && c.source == DeltaSource::Complication)
        .unwrap();
    assert_eq!(complication_heat.delta, 2);
}

#[test]
fn test_tension_move_matches_clock_keyword() {
    let ctx = with_noir_clocks(minimal_context());
    let planner = PlannerOutput {
        tension_move: "The deadline draws closer".to_string(),
        ..PlannerOutput::default()
    };

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &ValidatorOutput::default(),
        &planner,
        &ResolveOptions::default(),
    );

    let advanced = result
        .engine_events
        .iter()
        .find_map(|e| match e {
            EngineEvent::ClockAdvanced { details, .. } => Some(details),
            _ => None,
        })
        .unwrap();
    assert_eq!(advanced.clock, "time");

    let tension_delta = result
        .state_diff
        .clocks
        .iter()
        .find(|c| c.source == DeltaSource::Tension)
        .unwrap();
    assert_eq!(tension_delta.id, "time");
    assert_eq!(tension_delta.delta, -1);
}

#[test]
fn test_tension_move_without_match_emits_npc_action() {
    let ctx = with_noir_clocks(minimal_context());
    let planner = PlannerOutput {
        tension_move: "A stranger watches from across the street".to_string(),
        ..PlannerOutput::default()
    };

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &ValidatorOutput::default(),
        &planner,
        &ResolveOptions::default(),
    );

    let npc_actions: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::NpcAction { details, .. } => Some(details),
            _ => None,
        })
        .collect();
    assert_eq!(npc_actions.len(), 1);
    assert!(npc_actions[0].description.contains("stranger"));
    assert!(result.state_diff.clocks.is_empty());
}

#[test]
fn test_durations_sum_across_actions() {
    let ctx = with_noir_clocks(minimal_context());
    let mut investigate = ProposedAction::new("investigate", "scene");
    investigate.estimated_minutes = Some(30);
    let actions = vec![investigate, ProposedAction::new("look", "scene")];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(actions, &[]),
        &PlannerOutput::default(),
        &ResolveOptions::default(),
    );

    // 30 (estimate honored) + 1 (duration map for look).
    assert_eq!(result.total_estimated_minutes, 31);
}

#[test]
fn test_resolver_output_serializes_for_event_record() {
    let ctx = with_noir_clocks(combat_context());
    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_output(vec![ProposedAction::new("attack", "hostile_npc")], &["violence"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let events_json = turnforge_types::to_canonical_json(&result.engine_events).unwrap();
    let diff_json = turnforge_types::to_canonical_json(&result.state_diff).unwrap();
    let events: Vec<EngineEvent> = turnforge_types::from_canonical_json(&events_json).unwrap();
    let diff: turnforge_types::StateDiff =
        turnforge_types::from_canonical_json(&diff_json).unwrap();
    assert_eq!(events, result.engine_events);
    assert_eq!(diff, result.state_diff);
}
