use anyhow::Result;
use serde_json::json;
use std::collections::HashMap;

use turnforge_store::StateStore;
use turnforge_types::{Clock, Scene, SceneTime, Thread, ThreadStatus};

use crate::{make_known_fact, make_location, make_npc, make_player, make_world_fact};

/// Minimal game state: one campaign with default calibration, a player, a
/// friendly NPC, a location, the five standard clocks, one known and one
/// hidden fact, and an active thread.
pub fn setup_minimal_game_state(store: &StateStore, campaign_id: &str) -> Result<()> {
    store.create_campaign(
        campaign_id,
        "Test Campaign",
        &json!({
            "tone": {"gritty_vs_cinematic": 0.5},
            "themes": {"primary": ["testing"]},
            "risk": {"lethality": "moderate", "failure_mode": "consequential"},
        }),
        &json!({}),
        &json!({"setting": "Test setting"}),
    )?;

    store.create_entity(&make_player("Test Player"))?;
    store.create_entity(&make_npc(
        "test_npc",
        "Test NPC",
        "contact",
        "A helpful contact for testing",
    ))?;
    store.create_entity(&make_location(
        "test_location",
        "Test Location",
        "A place for testing",
    ))?;

    let mut scene = Scene::new(
        "test_location",
        vec!["player".to_string(), "test_npc".to_string()],
    );
    scene.time = SceneTime::new(12, 0);
    store.set_scene(&scene)?;

    setup_clocks(store, &HashMap::new())?;

    store.create_fact(&make_known_fact(
        "fact_known",
        "test_npc",
        "disposition",
        json!("friendly"),
    ))?;
    store.create_fact(&make_world_fact(
        "fact_hidden",
        "test_npc",
        "knows",
        json!({"secret": "something important"}),
    ))?;

    let mut thread = Thread::new("main_thread", "Test the system", ThreadStatus::Active);
    thread.stakes = json!({"success": "Tests pass", "failure": "Bugs found"});
    store.create_thread(&thread)?;

    store.create_relationship(
        "player",
        "test_npc",
        "trust",
        1,
        Some(&json!({"history": "Just met"})),
    )?;

    Ok(())
}

/// The five standard game clocks, with optional starting-value overrides.
pub fn setup_clocks(store: &StateStore, values: &HashMap<&str, i64>) -> Result<()> {
    let mut heat = Clock::new("heat", "Heat", *values.get("heat").unwrap_or(&0), 8);
    heat.triggers.insert("4".into(), "Attention increasing".into());
    heat.triggers.insert("6".into(), "Active investigation".into());
    heat.triggers.insert("8".into(), "Full alert".into());

    let mut time = Clock::new("time", "Time", *values.get("time").unwrap_or(&8), 12);
    time.triggers.insert("4".into(), "Time running short".into());

    let mut harm = Clock::new("harm", "Harm", *values.get("harm").unwrap_or(&0), 4);
    harm.triggers.insert("2".into(), "Seriously hurt".into());
    harm.triggers.insert("4".into(), "Critical condition".into());

    let cred = Clock::new("cred", "Cred", *values.get("cred").unwrap_or(&500), 9999);

    let mut rep = Clock::new("rep", "Rep", *values.get("rep").unwrap_or(&2), 5);
    rep.triggers.insert("4".into(), "Well known".into());

    for clock in [heat, time, harm, cred, rep] {
        store.create_clock(&clock)?;
    }
    Ok(())
}

/// Hostile-encounter state: a player with a knife facing a hostile NPC.
pub fn setup_combat_state(store: &StateStore, campaign_id: &str) -> Result<()> {
    store.create_campaign(
        campaign_id,
        "Combat Test Campaign",
        &json!({
            "risk": {"lethality": "moderate", "failure_mode": "consequential"},
        }),
        &json!({}),
        &json!({}),
    )?;

    store.create_entity(&make_player("Test Player"))?;
    let mut enemy = make_npc(
        "enemy",
        "Hostile Enemy",
        "enemy",
        "Someone looking for a fight",
    );
    enemy.tags.push("hostile".into());
    store.create_entity(&enemy)?;
    store.create_entity(&make_location(
        "combat_zone",
        "Combat Zone",
        "A dangerous place",
    ))?;

    let mut scene = Scene::new("combat_zone", vec!["player".to_string(), "enemy".to_string()]);
    scene.time = SceneTime::new(23, 0);
    store.set_scene(&scene)?;

    setup_clocks(store, &HashMap::from([("heat", 2)]))?;

    store.create_fact(&make_known_fact(
        "enemy_hostile",
        "enemy",
        "disposition",
        json!("hostile"),
    ))?;

    store.add_inventory("player", "knife", 1, Some(&equipped()))?;

    Ok(())
}

/// Crime-scene state: a witness, scene features, and three hidden clues.
pub fn setup_investigation_state(store: &StateStore, campaign_id: &str) -> Result<()> {
    store.create_campaign(
        campaign_id,
        "Investigation Test Campaign",
        &json!({
            "risk": {"lethality": "low", "failure_mode": "consequential"},
        }),
        &json!({}),
        &json!({}),
    )?;

    store.create_entity(&make_player("Test Player"))?;
    store.create_entity(&make_npc(
        "witness",
        "Nervous Witness",
        "witness",
        "Saw something, scared to talk",
    ))?;
    let mut scene_location = make_location("crime_scene", "Crime Scene", "Where it happened");
    scene_location.attrs.insert(
        "features".into(),
        json!(["blood", "broken glass", "overturned chair"]),
    );
    store.create_entity(&scene_location)?;

    let mut scene = Scene::new(
        "crime_scene",
        vec!["player".to_string(), "witness".to_string()],
    );
    scene.time = SceneTime::new(14, 0);
    store.set_scene(&scene)?;

    setup_clocks(store, &HashMap::new())?;

    store.create_fact(&make_known_fact(
        "crime_occurred",
        "crime_scene",
        "event",
        json!({"type": "murder", "victim": "unknown"}),
    ))?;

    // Three ways to find the truth.
    store.create_fact(&make_world_fact(
        "clue_witness",
        "witness",
        "knows",
        json!({"what": "saw the killer", "will_share": "if reassured"}),
    ))?;
    store.create_fact(&make_world_fact(
        "clue_physical",
        "crime_scene",
        "contains",
        json!({"item": "dropped ID", "location": "under chair"}),
    ))?;
    store.create_fact(&make_world_fact(
        "clue_digital",
        "crime_scene",
        "contains",
        json!({"item": "security footage", "location": "camera system"}),
    ))?;

    let mut thread = Thread::new("investigate_murder", "Find out who did it", ThreadStatus::Active);
    thread.stakes = json!({"success": "Justice", "failure": "Killer escapes"});
    store.create_thread(&thread)?;

    Ok(())
}

fn equipped() -> serde_json::Map<String, serde_json::Value> {
    let mut flags = serde_json::Map::new();
    flags.insert("equipped".into(), json!(true));
    flags
}
