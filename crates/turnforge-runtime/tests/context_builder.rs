//! Context packet construction and perception filtering.

use serde_json::json;
use turnforge_runtime::ContextBuilder;
use turnforge_store::StateStore;
use turnforge_testing::{make_npc, setup_minimal_game_state};
use turnforge_types::{
    new_event_id, to_canonical_json, ContextOptions, EngineEvent, EventRecord, FailureDetails,
    PerceptionClarity, PerceptionIssue, Scene, SituationSeverity, SuccessDetails, ThreatLevel,
    Visibility,
};

fn seeded_store() -> StateStore {
    let store = StateStore::open_in_memory().unwrap();
    setup_minimal_game_state(&store, "test_campaign").unwrap();
    store
}

fn build(store: &StateStore) -> turnforge_types::ContextPacket {
    ContextBuilder::new(store)
        .build_context("test_campaign", "test input", &ContextOptions::default())
        .unwrap()
}

#[test]
fn test_build_context_minimal() {
    let store = seeded_store();
    let ctx = build(&store);

    assert_eq!(ctx.scene.location_id, "test_location");
    assert!(ctx.present_entities.contains(&"player".to_string()));
    assert!(ctx.present_entities.contains(&"test_npc".to_string()));
    let clock_names: Vec<&str> = ctx.clocks.iter().map(|c| c.name.as_str()).collect();
    assert!(clock_names.contains(&"Heat"));
    assert!(clock_names.contains(&"Time"));
    assert!(clock_names.contains(&"Harm"));
    assert_eq!(
        ctx.calibration.risk.lethality,
        turnforge_types::Lethality::Moderate
    );
    assert_eq!(ctx.threads.len(), 1);
}

#[test]
fn test_only_known_facts_by_default() {
    let store = seeded_store();
    let ctx = build(&store);

    assert!(ctx.facts.iter().all(|f| f.visibility == Visibility::Known));
    assert!(!ctx.facts.iter().any(|f| f.id == "fact_hidden"));
}

#[test]
fn test_world_facts_with_option() {
    let store = seeded_store();
    let options = ContextOptions {
        include_world_facts: true,
        ..ContextOptions::default()
    };
    let ctx = ContextBuilder::new(&store)
        .build_context("test_campaign", "test", &options)
        .unwrap();

    assert!(ctx.facts.iter().any(|f| f.id == "fact_hidden"));
}

#[test]
fn test_obscured_entities_filtered() {
    let store = seeded_store();
    store
        .create_entity(&make_npc("hidden", "Hidden NPC", "unknown", "lurking"))
        .unwrap();
    let mut scene = Scene::new(
        "test_location",
        vec!["player".into(), "test_npc".into(), "hidden".into()],
    );
    scene.obscured_entities = vec!["hidden".into()];
    store.set_scene(&scene).unwrap();

    let ctx = build(&store);
    assert!(!ctx.present_entities.contains(&"hidden".to_string()));

    let options = ContextOptions {
        include_obscured: true,
        ..ContextOptions::default()
    };
    let ctx = ContextBuilder::new(&store)
        .build_context("test_campaign", "test", &options)
        .unwrap();
    assert!(ctx.present_entities.contains(&"hidden".to_string()));
}

#[test]
fn test_entity_perception_clear() {
    let store = seeded_store();
    let perception = ContextBuilder::new(&store)
        .get_entity_perception("test_npc")
        .unwrap();
    assert!(perception.perceivable);
    assert_eq!(perception.clarity, PerceptionClarity::Clear);
    assert!(perception.reason.is_none());
}

#[test]
fn test_entity_perception_obscured() {
    let store = seeded_store();
    store
        .create_entity(&make_npc("hidden", "Hidden NPC", "unknown", "lurking"))
        .unwrap();
    let mut scene = Scene::new(
        "test_location",
        vec!["player".into(), "test_npc".into(), "hidden".into()],
    );
    scene.obscured_entities = vec!["hidden".into()];
    store.set_scene(&scene).unwrap();

    let perception = ContextBuilder::new(&store)
        .get_entity_perception("hidden")
        .unwrap();
    assert!(perception.perceivable);
    assert_eq!(perception.clarity, PerceptionClarity::Obscured);
}

#[test]
fn test_entity_perception_not_present() {
    let store = seeded_store();
    store
        .create_entity(&make_npc("elsewhere", "Elsewhere NPC", "contact", "away"))
        .unwrap();

    let perception = ContextBuilder::new(&store)
        .get_entity_perception("elsewhere")
        .unwrap();
    assert!(!perception.perceivable);
    assert_eq!(perception.reason, Some(PerceptionIssue::NotPresent));
}

#[test]
fn test_entity_perception_not_known() {
    let store = seeded_store();
    let perception = ContextBuilder::new(&store)
        .get_entity_perception("nonexistent")
        .unwrap();
    assert!(!perception.perceivable);
    assert_eq!(perception.reason, Some(PerceptionIssue::NotKnown));
}

#[test]
fn test_npc_capabilities_extracted() {
    let store = seeded_store();
    let mut attrs = serde_json::Map::new();
    attrs.insert("role".into(), json!("contact"));
    attrs.insert("threat_level".into(), json!("high"));
    attrs.insert("capabilities".into(), json!(["information_brokering"]));
    attrs.insert("equipment".into(), json!(["commlink"]));
    attrs.insert("limitations".into(), json!(["non_combatant"]));
    attrs.insert(
        "escalation_profile".into(),
        json!({"soft": "watches", "hard": "sells you out"}),
    );
    store
        .update_entity("test_npc", None, Some(&attrs), None)
        .unwrap();

    let ctx = build(&store);
    assert_eq!(ctx.npc_capabilities.len(), 1);
    let cap = &ctx.npc_capabilities[0];
    assert_eq!(cap.entity_id, "test_npc");
    assert_eq!(cap.threat_level, ThreatLevel::High);
    assert!(cap.capabilities.contains(&"information_brokering".to_string()));
    assert_eq!(cap.escalation_profile.hard.as_deref(), Some("sells you out"));
}

#[test]
fn test_npc_without_capabilities_not_listed() {
    let store = seeded_store();
    let ctx = build(&store);
    assert!(ctx.npc_capabilities.is_empty());
}

#[test]
fn test_active_situations_in_context() {
    let store = seeded_store();
    store
        .create_fact(&turnforge_testing::make_known_fact(
            "sit_exposed",
            "player",
            "situation",
            json!({
                "condition": "exposed",
                "active": true,
                "source_action": "sneak",
                "severity": "soft",
                "clears_on": ["hide_success"],
                "narrative_hint": "Player is exposed",
            }),
        ))
        .unwrap();

    let ctx = build(&store);
    assert_eq!(ctx.active_situations.len(), 1);
    assert_eq!(ctx.active_situations[0].condition, "exposed");
    assert_eq!(ctx.active_situations[0].severity, SituationSeverity::Soft);
    assert_eq!(ctx.active_situations[0].fact_id, "sit_exposed");
}

#[test]
fn test_inactive_situation_excluded() {
    let store = seeded_store();
    store
        .create_fact(&turnforge_testing::make_known_fact(
            "sit_cleared",
            "player",
            "situation",
            json!({
                "condition": "exposed",
                "active": false,
                "source_action": "sneak",
                "severity": "soft",
                "clears_on": ["hide_success"],
                "narrative_hint": "Was exposed, now cleared",
            }),
        ))
        .unwrap();

    let ctx = build(&store);
    assert!(ctx.active_situations.is_empty());
}

fn failed_action_event(action: &str) -> EngineEvent {
    EngineEvent::ActionFailed {
        details: FailureDetails {
            action: action.to_string(),
            target_id: "scene".to_string(),
            description: String::new(),
            consequence: String::new(),
            failure_state: String::new(),
            estimated_minutes: 5,
            severity_tier: 1,
            botch: false,
        },
        tags: vec![],
    }
}

fn succeeded_action_event(action: &str) -> EngineEvent {
    EngineEvent::ActionSucceeded {
        details: SuccessDetails {
            action: action.to_string(),
            target_id: "scene".to_string(),
            description: String::new(),
            critical: false,
            outcome_state: String::new(),
            estimated_minutes: 1,
            discoveries: None,
        },
        tags: vec![],
    }
}

fn append_turn(store: &StateStore, turn_no: i64, events: &[EngineEvent]) {
    store
        .append_event(&EventRecord {
            id: new_event_id(),
            campaign_id: "test_campaign".to_string(),
            turn_no,
            player_input: format!("turn {}", turn_no),
            context_packet_json: "{}".to_string(),
            pass_outputs_json: "{}".to_string(),
            engine_events_json: to_canonical_json(&events).unwrap(),
            state_diff_json: "{}".to_string(),
            final_text: String::new(),
            prompt_versions_json: "{}".to_string(),
            created_at: String::new(),
        })
        .unwrap();
}

#[test]
fn test_failure_streak_zero_without_events() {
    let store = seeded_store();
    let ctx = build(&store);
    assert_eq!(ctx.failure_streak.count, 0);
    assert!(ctx.failure_streak.actions.is_empty());
}

#[test]
fn test_failure_streak_counts_consecutive_failures() {
    let store = seeded_store();
    append_turn(&store, 1, &[succeeded_action_event("examine")]);
    append_turn(&store, 2, &[failed_action_event("sneak")]);
    append_turn(&store, 3, &[failed_action_event("hide")]);

    let ctx = build(&store);
    assert_eq!(ctx.failure_streak.count, 2);
    assert!(ctx.failure_streak.actions.contains(&"sneak".to_string()));
    assert!(ctx.failure_streak.actions.contains(&"hide".to_string()));
}

#[test]
fn test_failure_streak_broken_by_success() {
    let store = seeded_store();
    append_turn(&store, 1, &[failed_action_event("sneak")]);
    append_turn(&store, 2, &[succeeded_action_event("hide")]);

    let ctx = build(&store);
    assert_eq!(ctx.failure_streak.count, 0);
}

#[test]
fn test_failure_streak_skips_actionless_turns() {
    let store = seeded_store();
    append_turn(&store, 1, &[failed_action_event("sneak")]);
    append_turn(&store, 2, &[]);
    append_turn(&store, 3, &[failed_action_event("hide")]);

    let ctx = build(&store);
    assert_eq!(ctx.failure_streak.count, 2);
}

#[test]
fn test_mixed_outcome_turn_breaks_streak() {
    let store = seeded_store();
    append_turn(&store, 1, &[failed_action_event("sneak")]);
    append_turn(
        &store,
        2,
        &[failed_action_event("sneak"), succeeded_action_event("talk")],
    );

    let ctx = build(&store);
    assert_eq!(ctx.failure_streak.count, 0);
}

#[test]
fn test_max_entities_option() {
    let store = seeded_store();
    let mut present = vec!["player".to_string()];
    for i in 0..10 {
        let id = format!("npc_{}", i);
        store
            .create_entity(&make_npc(&id, &format!("NPC {}", i), "extra", "crowd"))
            .unwrap();
        present.push(id);
    }
    store
        .set_scene(&Scene::new("test_location", present))
        .unwrap();

    let options = ContextOptions {
        max_entities: Some(5),
        ..ContextOptions::default()
    };
    let ctx = ContextBuilder::new(&store)
        .build_context("test_campaign", "test", &options)
        .unwrap();
    assert!(ctx.entities.len() <= 5);
}

#[test]
fn test_max_facts_option() {
    let store = seeded_store();
    for i in 0..20 {
        store
            .create_fact(&turnforge_testing::make_known_fact(
                &format!("fact_{}", i),
                "player",
                "knows",
                json!(format!("fact {}", i)),
            ))
            .unwrap();
    }

    let options = ContextOptions {
        max_facts: Some(10),
        ..ContextOptions::default()
    };
    let ctx = ContextBuilder::new(&store)
        .build_context("test_campaign", "test", &options)
        .unwrap();
    assert!(ctx.facts.len() <= 10);
}

#[test]
fn test_lore_context_empty_without_packs() {
    let store = seeded_store();
    let ctx = ContextBuilder::new(&store)
        .build_context("test_campaign", "what do I know about the docks", &ContextOptions::default())
        .unwrap();
    assert!(ctx.lore_context.is_empty());
}

#[test]
fn test_lore_context_surfaces_matching_chunks() {
    let store = seeded_store();
    store
        .add_content_pack("pack1", "test_campaign", "City Lore", "lore.pdf")
        .unwrap();
    store
        .add_pack_chunk("chunk1", "pack1", "test_campaign", 0, "The dockside cranes never stop")
        .unwrap();

    let ctx = ContextBuilder::new(&store)
        .build_context("test_campaign", "ask about the dockside", &ContextOptions::default())
        .unwrap();
    assert_eq!(ctx.lore_context.len(), 1);
    assert_eq!(ctx.lore_context[0]["chunk_id"], "chunk1");
}
