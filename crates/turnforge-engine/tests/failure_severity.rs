//! Severity tiers, situation facts, failure streaks, and threat resolution.

mod common;

use turnforge_engine::{compute_severity_tier, ResolveOptions, Resolver};
use turnforge_types::{
    EngineEvent, FailureStreak, PendingThreat, PlannerOutput, ProposedAction, SituationSeverity,
    ValidatorOutput, SITUATION_PREDICATE,
};

use common::{combat_context, high_threat_npc, minimal_context, soft_exposed_situation};

fn flags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn validator_with(action: &str, target: &str, risk_flags: &[&str]) -> ValidatorOutput {
    ValidatorOutput {
        allowed_actions: vec![ProposedAction::new(action, target)],
        risk_flags: flags(risk_flags),
        ..ValidatorOutput::default()
    }
}

fn force_roll(total: i64) -> ResolveOptions {
    ResolveOptions {
        force_roll: Some(total),
        ..ResolveOptions::default()
    }
}

fn pending_threat() -> PendingThreat {
    PendingThreat {
        fact_id: "t1".to_string(),
        description: "agent closing in".to_string(),
        turn_declared: 1,
        severity: "hard".to_string(),
    }
}

#[test]
fn test_tier0_no_risk_no_threat() {
    let ctx = minimal_context();
    assert_eq!(compute_severity_tier(&[], &ctx), 0);
}

#[test]
fn test_tier1_risk_flags_present() {
    let ctx = minimal_context();
    assert_eq!(compute_severity_tier(&flags(&["dangerous"]), &ctx), 1);
    assert_eq!(compute_severity_tier(&flags(&["pursuit"]), &ctx), 1);
}

#[test]
fn test_tier0_irrelevant_risk_flags() {
    let ctx = minimal_context();
    assert_eq!(compute_severity_tier(&flags(&["some_random_flag"]), &ctx), 0);
}

#[test]
fn test_tier2_pending_threats() {
    let mut ctx = minimal_context();
    ctx.pending_threats = vec![pending_threat()];
    assert_eq!(compute_severity_tier(&[], &ctx), 2);
}

#[test]
fn test_tier2_high_threat_npc() {
    let mut ctx = minimal_context();
    ctx.npc_capabilities = vec![high_threat_npc()];
    assert_eq!(compute_severity_tier(&[], &ctx), 2);
}

#[test]
fn test_tier2_hard_situation_active() {
    let mut ctx = minimal_context();
    let mut sit = soft_exposed_situation("sit1");
    sit.severity = SituationSeverity::Hard;
    ctx.active_situations = vec![sit];
    assert_eq!(compute_severity_tier(&[], &ctx), 2);
}

#[test]
fn test_tier2_overrides_tier1() {
    let mut ctx = minimal_context();
    ctx.pending_threats = vec![pending_threat()];
    assert_eq!(compute_severity_tier(&flags(&["dangerous"]), &ctx), 2);
}

#[test]
fn test_failure_creates_situation_at_tier1() {
    let mut ctx = minimal_context();
    ctx.present_entities.push("guard".to_string());
    ctx.entities.push(common::make_npc("guard", "Guard", "guard"));

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "guard", &["dangerous"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let created: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::SituationCreated { details, .. } => Some(details),
            _ => None,
        })
        .collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].condition, "exposed");
    assert_eq!(created[0].severity, SituationSeverity::Soft);

    let situation_facts: Vec<_> = result
        .state_diff
        .facts_add
        .iter()
        .filter(|f| f.predicate == SITUATION_PREDICATE)
        .collect();
    assert_eq!(situation_facts.len(), 1);
    assert_eq!(situation_facts[0].object["condition"], "exposed");
    assert_eq!(situation_facts[0].object["active"], true);
    let clears = situation_facts[0].object["clears_on"].as_array().unwrap();
    assert!(clears.iter().any(|v| v == "hide_success"));
    assert!(clears.iter().any(|v| v == "flee_success"));
    assert!(clears.iter().any(|v| v == "scene_change"));
}

#[test]
fn test_failure_creates_hard_situation_at_tier2() {
    let mut ctx = minimal_context();
    ctx.present_entities.push("agent".to_string());
    ctx.entities.push(common::make_npc("agent", "Agent", "agent"));
    let mut npc = high_threat_npc();
    npc.entity_id = "agent".to_string();
    ctx.npc_capabilities = vec![npc];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "agent", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let created: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::SituationCreated { details, .. } => Some(details),
            _ => None,
        })
        .collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].severity, SituationSeverity::Hard);
}

#[test]
fn test_no_situation_at_tier0() {
    let mut ctx = minimal_context();
    ctx.present_entities.push("target".to_string());
    ctx.entities.push(common::make_npc("target", "Target", "npc"));

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("hack", "target", &[]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let created = result
        .engine_events
        .iter()
        .filter(|e| matches!(e, EngineEvent::SituationCreated { .. }))
        .count();
    assert_eq!(created, 0);
}

#[test]
fn test_success_clears_matching_situation() {
    let mut ctx = combat_context();
    ctx.active_situations = vec![soft_exposed_situation("sit_exposed_1")];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("hide", "combat_location", &[]),
        &PlannerOutput::default(),
        &force_roll(10),
    );

    let cleared: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::SituationCleared { details, .. } => Some(details),
            _ => None,
        })
        .collect();
    assert_eq!(cleared.len(), 1);
    assert_eq!(cleared[0].condition, "exposed");
    assert_eq!(cleared[0].fact_id, "sit_exposed_1");
    assert_eq!(cleared[0].cleared_by, "hide_success");
}

#[test]
fn test_success_does_not_clear_unrelated_situation() {
    let mut ctx = combat_context();
    let mut sit = soft_exposed_situation("sit_detected_1");
    sit.condition = "detected".to_string();
    sit.source_action = "hack".to_string();
    sit.clears_on = vec!["scene_change".to_string(), "deceive_success".to_string()];
    ctx.active_situations = vec![sit];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("hide", "combat_location", &[]),
        &PlannerOutput::default(),
        &force_roll(10),
    );

    let cleared = result
        .engine_events
        .iter()
        .filter(|e| matches!(e, EngineEvent::SituationCleared { .. }))
        .count();
    assert_eq!(cleared, 0);
}

#[test]
fn test_duplicate_situation_not_created() {
    let mut ctx = minimal_context();
    ctx.present_entities.push("guard".to_string());
    ctx.entities.push(common::make_npc("guard", "Guard", "guard"));
    ctx.active_situations = vec![soft_exposed_situation("existing_sit")];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "guard", &["dangerous"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let new_situations = result
        .state_diff
        .facts_add
        .iter()
        .filter(|f| f.predicate == SITUATION_PREDICATE)
        .count();
    assert_eq!(new_situations, 0);
}

#[test]
fn test_situation_upgrades_soft_to_hard() {
    let mut ctx = minimal_context();
    ctx.present_entities.push("agent".to_string());
    ctx.entities.push(common::make_npc("agent", "Agent", "agent"));
    let mut npc = high_threat_npc();
    npc.entity_id = "agent".to_string();
    ctx.npc_capabilities = vec![npc];
    ctx.active_situations = vec![soft_exposed_situation("existing_sit")];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "agent", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let created: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::SituationCreated { details, .. } => Some(details),
            _ => None,
        })
        .collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].severity, SituationSeverity::Hard);
    assert_eq!(created[0].upgraded_from, Some(SituationSeverity::Soft));

    // The existing fact is updated rather than a new row added.
    let new_situations = result
        .state_diff
        .facts_add
        .iter()
        .filter(|f| f.predicate == SITUATION_PREDICATE)
        .count();
    assert_eq!(new_situations, 0);
    let updates: Vec<_> = result
        .state_diff
        .facts_update
        .iter()
        .filter(|u| u.id == "existing_sit")
        .collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].object.as_ref().unwrap()["severity"], "hard");
}

#[test]
fn test_tier2_physical_failure_adds_harm() {
    let mut ctx = combat_context();
    ctx.pending_threats = vec![pending_threat()];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let harm: i64 = result
        .state_diff
        .clocks
        .iter()
        .filter(|c| c.id == "harm")
        .map(|c| c.delta)
        .sum();
    assert!(harm >= 1);
}

#[test]
fn test_tier2_stealth_failure_adds_extra_heat() {
    let mut ctx = combat_context();
    ctx.pending_threats = vec![pending_threat()];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let heat_entries = result
        .state_diff
        .clocks
        .iter()
        .filter(|c| c.id == "heat")
        .count();
    assert!(heat_entries >= 1);
}

fn threat_context() -> turnforge_types::ContextPacket {
    let mut ctx = combat_context();
    ctx.npc_capabilities = vec![high_threat_npc()];
    ctx.failure_streak = FailureStreak {
        count: 0,
        actions: vec![],
        during_threat: true,
    };
    ctx
}

#[test]
fn test_no_warning_at_count_0() {
    let ctx = threat_context();
    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );
    let warnings = result
        .engine_events
        .iter()
        .filter(|e| matches!(e, EngineEvent::FailureStreakWarning { .. }))
        .count();
    assert_eq!(warnings, 0);
}

#[test]
fn test_warning_at_threshold_minus_1() {
    let mut ctx = threat_context();
    ctx.failure_streak.count = 1;
    ctx.failure_streak.actions = vec!["sneak".to_string()];

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let warnings: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::FailureStreakWarning { details, .. } => Some(details),
            _ => None,
        })
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].next_failure_critical);
    assert_eq!(warnings[0].streak_count, 2);
}

#[test]
fn test_threat_resolution_at_threshold() {
    let mut ctx = threat_context();
    ctx.failure_streak.count = 2;

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let resolutions: Vec<_> = result
        .engine_events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::ThreatResolvedAgainstPlayer { details, tags } => Some((details, tags)),
            _ => None,
        })
        .collect();
    assert_eq!(resolutions.len(), 1);
    let (details, tags) = &resolutions[0];
    assert!(details.binding);
    assert_eq!(details.threat_entity_id, "hostile_npc");
    assert_eq!(details.harm_delta, 2);
    assert!(tags.iter().any(|t| t == "binding"));
}

#[test]
fn test_threat_resolution_applies_harm() {
    let mut ctx = threat_context();
    ctx.failure_streak.count = 2;

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let harm_entries: Vec<_> = result
        .state_diff
        .clocks
        .iter()
        .filter(|c| {
            c.id == "harm" && c.source == turnforge_types::DeltaSource::ThreatResolution
        })
        .collect();
    assert_eq!(harm_entries.len(), 1);
    assert_eq!(harm_entries[0].delta, 2);
}

#[test]
fn test_threat_resolution_creates_cornered_situation() {
    let mut ctx = threat_context();
    ctx.failure_streak.count = 2;

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let cornered: Vec<_> = result
        .state_diff
        .facts_add
        .iter()
        .filter(|f| f.predicate == SITUATION_PREDICATE && f.object["condition"] == "cornered")
        .collect();
    assert!(!cornered.is_empty());
    assert_eq!(cornered[0].object["severity"], "hard");
}

#[test]
fn test_success_breaks_streak_no_resolution() {
    let mut ctx = threat_context();
    ctx.failure_streak.count = 2;

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(10),
    );

    let resolutions = result
        .engine_events
        .iter()
        .filter(|e| matches!(e, EngineEvent::ThreatResolvedAgainstPlayer { .. }))
        .count();
    assert_eq!(resolutions, 0);
}

#[test]
fn test_no_resolution_without_active_threat() {
    let mut ctx = minimal_context();
    ctx.present_entities.push("target".to_string());
    ctx.entities.push(common::make_npc("target", "Target", "npc"));
    ctx.failure_streak = FailureStreak {
        count: 2,
        actions: vec!["hack".to_string(), "hack".to_string()],
        during_threat: false,
    };

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("hack", "target", &[]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let resolutions = result
        .engine_events
        .iter()
        .filter(|e| matches!(e, EngineEvent::ThreatResolvedAgainstPlayer { .. }))
        .count();
    assert_eq!(resolutions, 0);
}

#[test]
fn test_escalation_profile_used_in_resolution() {
    let mut ctx = threat_context();
    ctx.failure_streak.count = 2;

    let result = Resolver::new(&ctx).resolve(
        &ctx,
        &validator_with("sneak", "hostile_npc", &["hostile_present"]),
        &PlannerOutput::default(),
        &force_roll(4),
    );

    let resolution = result
        .engine_events
        .iter()
        .find_map(|e| match e {
            EngineEvent::ThreatResolvedAgainstPlayer { details, .. } => Some(details),
            _ => None,
        })
        .unwrap();
    assert!(resolution
        .consequence_description
        .to_lowercase()
        .contains("confrontation"));
}
