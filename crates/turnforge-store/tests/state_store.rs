//! Store CRUD, clock clamping and triggers, diff application, and the
//! event-log turn counter.

use serde_json::json;
use turnforge_store::{Error, StateStore};
use turnforge_types::{
    new_event_id, Clock, ClockDelta, DeltaSource, Entity, EntityKind, EventRecord, Fact, FactAdd,
    FactUpdate, InventoryChange, RelationshipChange, Scene, StateDiff, Thread, ThreadStatus,
    Visibility,
};

fn store() -> StateStore {
    StateStore::open_in_memory().unwrap()
}

fn fact(id: &str, subject: &str, predicate: &str, object: serde_json::Value, visibility: Visibility) -> Fact {
    Fact {
        id: id.to_string(),
        subject_id: subject.to_string(),
        predicate: predicate.to_string(),
        object,
        visibility,
        confidence: 1.0,
        tags: vec![],
        discovered_turn: None,
        discovery_method: None,
    }
}

fn event(campaign: &str, turn_no: i64, input: &str) -> EventRecord {
    EventRecord {
        id: new_event_id(),
        campaign_id: campaign.to_string(),
        turn_no,
        player_input: input.to_string(),
        context_packet_json: "{}".to_string(),
        pass_outputs_json: "{}".to_string(),
        engine_events_json: "[]".to_string(),
        state_diff_json: "{}".to_string(),
        final_text: format!("Turn {} result", turn_no),
        prompt_versions_json: "{}".to_string(),
        created_at: String::new(),
    }
}

#[test]
fn test_create_and_get_campaign() {
    let store = store();
    let campaign = store
        .create_campaign(
            "c1",
            "Test Campaign",
            &json!({"tone": {"dark": 0.5}}),
            &json!({"dice": "2d6"}),
            &json!({"setting": "noir"}),
        )
        .unwrap();
    assert_eq!(campaign.current_turn, 0);

    let loaded = store.get_campaign("c1").unwrap().unwrap();
    assert_eq!(loaded.name, "Test Campaign");
    assert_eq!(loaded.calibration["tone"]["dark"], 0.5);
    assert_eq!(loaded.system["dice"], "2d6");
}

#[test]
fn test_get_nonexistent_campaign() {
    assert!(store().get_campaign("nonexistent").unwrap().is_none());
}

#[test]
fn test_ensure_campaign_creates_bare_row() {
    let store = store();
    let campaign = store.ensure_campaign("fresh").unwrap();
    assert_eq!(campaign.id, "fresh");
    assert!(store.get_campaign("fresh").unwrap().is_some());
}

#[test]
fn test_entity_crud() {
    let store = store();
    let mut entity = Entity::new("e1", EntityKind::Npc, "Test NPC");
    entity.attrs.insert("role".into(), json!("villain"));
    entity.tags.push("hostile".into());
    store.create_entity(&entity).unwrap();

    let loaded = store.get_entity("e1").unwrap().unwrap();
    assert_eq!(loaded.name, "Test NPC");
    assert_eq!(loaded.kind, EntityKind::Npc);
    assert_eq!(loaded.attrs["role"], "villain");
    assert!(loaded.tags.contains(&"hostile".to_string()));

    store
        .update_entity("e1", Some("New Name"), None, None)
        .unwrap();
    assert_eq!(store.get_entity("e1").unwrap().unwrap().name, "New Name");

    store.delete_entity("e1").unwrap();
    assert!(store.get_entity("e1").unwrap().is_none());
}

#[test]
fn test_entities_by_kind_and_ids() {
    let store = store();
    store
        .create_entity(&Entity::new("npc1", EntityKind::Npc, "One"))
        .unwrap();
    store
        .create_entity(&Entity::new("npc2", EntityKind::Npc, "Two"))
        .unwrap();
    store
        .create_entity(&Entity::new("loc1", EntityKind::Location, "Place"))
        .unwrap();

    assert_eq!(store.get_entities_by_kind("npc").unwrap().len(), 2);
    assert_eq!(store.get_entities_by_kind("location").unwrap().len(), 1);

    let picked = store
        .get_entities_by_ids(&["npc1".to_string(), "loc1".to_string()])
        .unwrap();
    assert_eq!(picked.len(), 2);
}

#[test]
fn test_fact_crud_and_visibility() {
    let store = store();
    store
        .create_fact(&fact("f1", "npc1", "status", json!("alive"), Visibility::Known))
        .unwrap();
    store
        .create_fact(&fact("f2", "npc1", "location", json!("bar"), Visibility::World))
        .unwrap();
    store
        .create_fact(&fact("f3", "npc2", "status", json!("dead"), Visibility::Known))
        .unwrap();

    assert_eq!(store.get_facts_for_subject("npc1").unwrap().len(), 2);
    assert_eq!(store.get_known_facts().unwrap().len(), 2);
}

#[test]
fn test_mark_fact_discovered() {
    let store = store();
    store
        .create_fact(&fact("f1", "s1", "knows", json!({"secret": true}), Visibility::World))
        .unwrap();

    store.mark_fact_discovered("f1", 5, "investigation").unwrap();

    let discovered = store.get_fact("f1").unwrap().unwrap();
    assert_eq!(discovered.visibility, Visibility::Known);
    assert_eq!(discovered.discovered_turn, Some(5));
    assert_eq!(discovered.discovery_method, Some("investigation".to_string()));
}

#[test]
fn test_known_fact_never_demoted_to_world() {
    let store = store();
    store
        .create_fact(&fact("f1", "s1", "status", json!("seen"), Visibility::Known))
        .unwrap();

    store
        .update_fact("f1", None, Some(Visibility::World))
        .unwrap();

    let unchanged = store.get_fact("f1").unwrap().unwrap();
    assert_eq!(unchanged.visibility, Visibility::Known);
}

#[test]
fn test_clock_clamping() {
    let store = store();
    store.create_clock(&Clock::new("heat", "Heat", 2, 8)).unwrap();

    store.update_clock("heat", 100).unwrap();
    assert_eq!(store.get_clock("heat").unwrap().unwrap().value, 8);

    store.update_clock("heat", -5).unwrap();
    assert_eq!(store.get_clock("heat").unwrap().unwrap().value, 0);
}

#[test]
fn test_adjust_clock() {
    let store = store();
    store.create_clock(&Clock::new("heat", "Heat", 2, 8)).unwrap();
    store.adjust_clock("heat", 3).unwrap();
    assert_eq!(store.get_clock("heat").unwrap().unwrap().value, 5);
}

#[test]
fn test_clock_triggers_fire_on_upward_crossing() {
    let store = store();
    let mut clock = Clock::new("heat", "Heat", 2, 8);
    clock.triggers.insert("4".into(), "Cops alerted".into());
    clock.triggers.insert("6".into(), "Active investigation".into());
    store.create_clock(&clock).unwrap();

    let triggered = store.update_clock("heat", 5).unwrap();
    assert_eq!(triggered, vec!["Cops alerted".to_string()]);

    // Already past 4; only 6 fires on the next crossing.
    let triggered = store.update_clock("heat", 7).unwrap();
    assert_eq!(triggered, vec!["Active investigation".to_string()]);
}

#[test]
fn test_clock_multiple_triggers_at_once() {
    let store = store();
    let mut clock = Clock::new("heat", "Heat", 2, 8);
    clock.triggers.insert("4".into(), "Cops alerted".into());
    clock.triggers.insert("6".into(), "Active investigation".into());
    store.create_clock(&clock).unwrap();

    let triggered = store.update_clock("heat", 7).unwrap();
    assert_eq!(triggered.len(), 2);
}

#[test]
fn test_get_clock_by_name() {
    let store = store();
    store.create_clock(&Clock::new("c1", "Heat", 0, 8)).unwrap();
    assert_eq!(store.get_clock_by_name("Heat").unwrap().unwrap().id, "c1");
}

#[test]
fn test_scene_roundtrip() {
    let store = store();
    let mut scene = Scene::new("bar", vec!["player".to_string(), "npc1".to_string()]);
    scene.time.hour = 23;
    scene.visibility_conditions = "dim".to_string();
    store.set_scene(&scene).unwrap();

    let loaded = store.get_scene().unwrap().unwrap();
    assert_eq!(loaded.location_id, "bar");
    assert_eq!(loaded.time.hour, 23);
    assert_eq!(loaded.visibility_conditions, "dim");

    store
        .update_scene_entities(&["player".to_string(), "npc1".to_string(), "npc2".to_string()])
        .unwrap();
    assert_eq!(store.get_scene().unwrap().unwrap().present_entity_ids.len(), 3);
}

#[test]
fn test_thread_operations() {
    let store = store();
    store
        .create_thread(&Thread::new("t1", "Find the killer", ThreadStatus::Active))
        .unwrap();
    store
        .create_thread(&Thread::new("t2", "Pay the rent", ThreadStatus::Active))
        .unwrap();
    store
        .create_thread(&Thread::new("t3", "Done already", ThreadStatus::Resolved))
        .unwrap();

    assert_eq!(store.get_active_threads().unwrap().len(), 2);

    store
        .update_thread("t1", Some(ThreadStatus::Resolved), None)
        .unwrap();
    assert_eq!(
        store.get_thread("t1").unwrap().unwrap().status,
        ThreadStatus::Resolved
    );
}

#[test]
fn test_inventory_stacking_and_depletion() {
    let store = store();
    store.add_inventory("player", "ammo", 10, None).unwrap();
    store.add_inventory("player", "ammo", 5, None).unwrap();
    assert_eq!(
        store.get_inventory_item("player", "ammo").unwrap().unwrap().qty,
        15
    );

    let remains = store.remove_inventory("player", "ammo", 3).unwrap();
    assert!(remains);
    assert_eq!(
        store.get_inventory_item("player", "ammo").unwrap().unwrap().qty,
        12
    );

    let remains = store.remove_inventory("player", "ammo", 12).unwrap();
    assert!(!remains);
    assert!(store.get_inventory_item("player", "ammo").unwrap().is_none());
}

#[test]
fn test_relationship_operations() {
    let store = store();
    store
        .create_relationship("player", "npc1", "trust", 2, Some(&json!({"history": "saved"})))
        .unwrap();
    store
        .create_relationship("player", "npc2", "fear", -1, None)
        .unwrap();
    store
        .create_relationship("npc3", "player", "owes", 1, None)
        .unwrap();

    assert_eq!(store.get_relationships_for_entity("player").unwrap().len(), 3);

    store
        .update_relationship_intensity("player", "npc1", "trust", 1)
        .unwrap();
    assert_eq!(
        store
            .get_relationship("player", "npc1", "trust")
            .unwrap()
            .unwrap()
            .intensity,
        3
    );
}

#[test]
fn test_relationship_delta_creates_missing_row() {
    let store = store();
    store
        .update_relationship_intensity("player", "stranger", "trust", 1)
        .unwrap();
    assert_eq!(
        store
            .get_relationship("player", "stranger", "trust")
            .unwrap()
            .unwrap()
            .intensity,
        1
    );
}

#[test]
fn test_apply_state_diff_clocks() {
    let store = store();
    store.create_clock(&Clock::new("heat", "Heat", 2, 8)).unwrap();
    store.create_clock(&Clock::new("time", "Time", 8, 12)).unwrap();

    let mut diff = StateDiff::default();
    diff.clocks.push(ClockDelta {
        id: "heat".into(),
        delta: 2,
        source: DeltaSource::Cost,
    });
    diff.clocks.push(ClockDelta {
        id: "time".into(),
        delta: -1,
        source: DeltaSource::Cost,
    });

    store.apply_state_diff(&diff, 1).unwrap();

    assert_eq!(store.get_clock("heat").unwrap().unwrap().value, 4);
    assert_eq!(store.get_clock("time").unwrap().unwrap().value, 7);
}

#[test]
fn test_apply_state_diff_unknown_clock_is_noop() {
    let store = store();
    let mut diff = StateDiff::default();
    diff.clocks.push(ClockDelta {
        id: "paradox".into(),
        delta: 1,
        source: DeltaSource::Failure,
    });
    let triggers = store.apply_state_diff(&diff, 1).unwrap();
    assert!(triggers.is_empty());
}

#[test]
fn test_apply_state_diff_facts() {
    let store = store();
    store
        .create_fact(&fact("f1", "npc1", "status", json!("unknown"), Visibility::World))
        .unwrap();

    let mut diff = StateDiff::default();
    diff.facts_add.push(FactAdd {
        id: None,
        subject_id: "npc2".into(),
        predicate: "location".into(),
        object: json!("bar"),
        visibility: Visibility::Known,
        tags: vec![],
    });
    diff.facts_update.push(FactUpdate {
        id: "f1".into(),
        object: Some(json!("dead")),
        visibility: Some(Visibility::Known),
    });

    store.apply_state_diff(&diff, 7).unwrap();

    let added = store.get_facts_for_subject("npc2").unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].object, json!("bar"));
    assert!(!added[0].id.is_empty());

    let updated = store.get_fact("f1").unwrap().unwrap();
    assert_eq!(updated.object, json!("dead"));
    assert_eq!(updated.visibility, Visibility::Known);
    assert_eq!(updated.discovered_turn, Some(7));
}

#[test]
fn test_apply_state_diff_inventory() {
    let store = store();
    store.add_inventory("player", "ammo", 10, None).unwrap();

    let mut diff = StateDiff::default();
    diff.inventory_changes.push(InventoryChange {
        owner_id: "player".into(),
        item_id: "ammo".into(),
        delta: -3,
        flags: None,
    });
    diff.inventory_changes.push(InventoryChange {
        owner_id: "player".into(),
        item_id: "medkit".into(),
        delta: 1,
        flags: None,
    });

    store.apply_state_diff(&diff, 1).unwrap();

    assert_eq!(
        store.get_inventory_item("player", "ammo").unwrap().unwrap().qty,
        7
    );
    assert_eq!(
        store.get_inventory_item("player", "medkit").unwrap().unwrap().qty,
        1
    );
}

#[test]
fn test_apply_state_diff_scene_merge() {
    let store = store();
    let mut scene = Scene::new("bar", vec!["player".to_string()]);
    scene.time.hour = 22;
    store.set_scene(&scene).unwrap();

    let mut diff = StateDiff::default();
    diff.scene_update
        .insert("noise_level".into(), json!("loud"));
    diff.scene_update.insert(
        "time".into(),
        json!({"hour": 23, "minute": 30, "period": "night"}),
    );

    store.apply_state_diff(&diff, 1).unwrap();

    let merged = store.get_scene().unwrap().unwrap();
    assert_eq!(merged.location_id, "bar");
    assert_eq!(merged.noise_level, "loud");
    assert_eq!(merged.time.hour, 23);
    assert_eq!(merged.time.minute, 30);
}

#[test]
fn test_apply_state_diff_relationships_and_threads() {
    let store = store();
    store
        .create_thread(&Thread::new("t1", "Old title", ThreadStatus::Active))
        .unwrap();

    let mut diff = StateDiff::default();
    diff.threads_update.push(turnforge_types::ThreadUpdate {
        id: "t1".into(),
        status: Some(ThreadStatus::Resolved),
        title: None,
    });
    diff.relationship_changes.push(RelationshipChange {
        a_id: "player".into(),
        b_id: "npc1".into(),
        rel_type: "trust".into(),
        delta: 1,
    });

    store.apply_state_diff(&diff, 1).unwrap();

    assert_eq!(
        store.get_thread("t1").unwrap().unwrap().status,
        ThreadStatus::Resolved
    );
    assert_eq!(
        store
            .get_relationship("player", "npc1", "trust")
            .unwrap()
            .unwrap()
            .intensity,
        1
    );
}

#[test]
fn test_apply_state_diff_returns_triggers() {
    let store = store();
    let mut clock = Clock::new("heat", "Heat", 3, 8);
    clock.triggers.insert("4".into(), "Alert!".into());
    store.create_clock(&clock).unwrap();

    let mut diff = StateDiff::default();
    diff.clocks.push(ClockDelta {
        id: "heat".into(),
        delta: 2,
        source: DeltaSource::Failure,
    });

    let triggered = store.apply_state_diff(&diff, 1).unwrap();
    assert!(triggered.contains(&"Alert!".to_string()));
}

#[test]
fn test_append_and_get_event() {
    let store = store();
    store.append_event(&event("c1", 1, "look around")).unwrap();

    let loaded = store.get_event("c1", 1).unwrap().unwrap();
    assert_eq!(loaded.player_input, "look around");
    assert!(!loaded.created_at.is_empty());
}

#[test]
fn test_duplicate_turn_rejected() {
    let store = store();
    store.append_event(&event("c1", 1, "first")).unwrap();

    let result = store.append_event(&event("c1", 1, "second"));
    match result {
        Err(Error::DuplicateTurn {
            campaign_id,
            turn_no,
        }) => {
            assert_eq!(campaign_id, "c1");
            assert_eq!(turn_no, 1);
        }
        other => panic!("expected DuplicateTurn, got {:?}", other.map(|_| ())),
    }

    // Same turn number in a different campaign is fine.
    store.append_event(&event("c2", 1, "elsewhere")).unwrap();
}

#[test]
fn test_get_events_range() {
    let store = store();
    for i in 1..=5 {
        store.append_event(&event("c1", i, &format!("turn {}", i))).unwrap();
    }

    let events = store.get_events_range("c1", 2, 4).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].turn_no, 2);
    assert_eq!(events[2].turn_no, 4);
}

#[test]
fn test_get_next_turn_no() {
    let store = store();
    assert_eq!(store.get_next_turn_no("c1").unwrap(), 1);
    store.append_event(&event("c1", 1, "test")).unwrap();
    assert_eq!(store.get_next_turn_no("c1").unwrap(), 2);
}

#[test]
fn test_get_recent_events_newest_first() {
    let store = store();
    for i in 1..=6 {
        store.append_event(&event("c1", i, &format!("turn {}", i))).unwrap();
    }

    let recent = store.get_recent_events("c1", 3).unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].turn_no, 6);
    assert_eq!(recent[2].turn_no, 4);
}

#[test]
fn test_pack_chunk_search() {
    let store = store();
    store
        .add_content_pack("pack1", "c1", "City Lore", "rulebook.pdf")
        .unwrap();
    store
        .add_pack_chunk("chunk1", "pack1", "c1", 0, "The neon district never sleeps")
        .unwrap();
    store
        .add_pack_chunk("chunk2", "pack1", "c1", 1, "Dockside warehouses hide smugglers")
        .unwrap();
    store
        .add_pack_chunk("chunk3", "pack1", "other_campaign", 0, "Neon spires of another city")
        .unwrap();

    let matches = store.search_pack_chunks("c1", "neon", 10).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].chunk_id, "chunk1");
}

#[test]
fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.db");

    {
        let store = StateStore::open(&path).unwrap();
        store
            .create_entity(&Entity::new("e1", EntityKind::Npc, "Persistent NPC"))
            .unwrap();
    }

    let reopened = StateStore::open(&path).unwrap();
    assert_eq!(
        reopened.get_entity("e1").unwrap().unwrap().name,
        "Persistent NPC"
    );
}

#[test]
fn test_session_bookkeeping() {
    let store = store();
    let session = store.open_session("c1").unwrap();
    assert_eq!(session.turn_start, 0);
    assert!(session.ended_at.is_none());

    store.close_session(&session.id, 4).unwrap();
    let latest = store.get_latest_session("c1").unwrap().unwrap();
    assert_eq!(latest.turn_end, Some(4));
    assert!(latest.ended_at.is_some());
}
