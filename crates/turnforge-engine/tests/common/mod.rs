//! Context-packet factories shared by the engine test suites.
#![allow(dead_code)]

use serde_json::json;
use turnforge_engine::{cyberpunk_noir_clock_rules, mage_ascension_resolution_rules};
use turnforge_types::{
    ActiveSituation, Calibration, Clock, ContextPacket, ContextSummary, Entity, EntityKind,
    EscalationProfile, FailureStreak, InventoryRow, NpcCapability, RiskSettings, Scene, SceneTime,
    SituationSeverity, Thread, ThreadStatus, ThreatLevel,
};

pub fn make_player(name: &str) -> Entity {
    let mut player = Entity::new("player", EntityKind::Pc, name);
    player
        .attrs
        .insert("background".into(), json!("Drifter with a past"));
    player.tags.push("player".into());
    player
}

pub fn make_npc(id: &str, name: &str, role: &str) -> Entity {
    let mut npc = Entity::new(id, EntityKind::Npc, name);
    npc.attrs.insert("role".into(), json!(role));
    npc
}

pub fn make_location(id: &str, name: &str) -> Entity {
    Entity::new(id, EntityKind::Location, name)
}

pub fn standard_clocks() -> Vec<Clock> {
    vec![
        Clock::new("heat", "Heat", 0, 8),
        Clock::new("time", "Time", 8, 12),
        Clock::new("harm", "Harm", 0, 4),
    ]
}

/// Minimal valid context: just a player in a room with basic clocks.
pub fn minimal_context() -> ContextPacket {
    let player = make_player("Test Player");
    let location = make_location("test_location", "Test Room");

    let mut scene = Scene::new(
        "test_location",
        vec!["player".to_string(), "test_location".to_string()],
    );
    scene.time = SceneTime::new(12, 0);

    ContextPacket {
        scene,
        present_entities: vec!["player".to_string(), "test_location".to_string()],
        entities: vec![player, location],
        facts: vec![],
        threads: vec![],
        clocks: standard_clocks(),
        inventory: vec![],
        summary: ContextSummary::default(),
        recent_events: vec![],
        calibration: Calibration {
            tone: json!({}),
            themes: json!({}),
            risk: RiskSettings::default(),
        },
        genre_rules: json!({}),
        system: json!({}),
        active_situations: vec![],
        npc_capabilities: vec![],
        pending_threats: vec![],
        failure_streak: FailureStreak::default(),
        lore_context: vec![],
    }
}

/// Context with a hostile NPC in a dark alley for combat testing.
pub fn combat_context() -> ContextPacket {
    let mut ctx = minimal_context();
    let enemy = make_npc("hostile_npc", "Hostile Goon", "enemy");
    let location = make_location("combat_location", "Dark Alley");

    ctx.scene = Scene::new(
        "combat_location",
        vec![
            "player".to_string(),
            "hostile_npc".to_string(),
            "combat_location".to_string(),
        ],
    );
    ctx.scene.time = SceneTime::new(23, 0);
    ctx.scene.visibility_conditions = "dim".to_string();
    ctx.present_entities = ctx.scene.present_entity_ids.clone();
    ctx.entities = vec![make_player("Test Player"), enemy, location];
    ctx.clocks = vec![
        Clock::new("heat", "Heat", 2, 8),
        Clock::new("time", "Time", 6, 12),
        Clock::new("harm", "Harm", 0, 4),
    ];
    ctx.inventory = vec![InventoryRow::new("player", "knife", 1)];
    ctx.threads = vec![Thread::new(
        "thread_confrontation",
        "Deal with the hostile",
        ThreadStatus::Active,
    )];
    ctx
}

/// A high-threat NPC with a full escalation profile.
pub fn high_threat_npc() -> NpcCapability {
    NpcCapability {
        entity_id: "hostile_npc".to_string(),
        name: "Agent Chen".to_string(),
        threat_level: ThreatLevel::High,
        capabilities: vec!["armed_combat".to_string(), "tactical_training".to_string()],
        equipment: vec!["sidearm".to_string()],
        limitations: vec!["operates_solo".to_string()],
        escalation_profile: EscalationProfile {
            soft: Some("Surveillance - follows, tracks".to_string()),
            hard: Some("Direct confrontation - corners target, draws weapon".to_string()),
        },
    }
}

pub fn soft_exposed_situation(fact_id: &str) -> ActiveSituation {
    ActiveSituation {
        fact_id: fact_id.to_string(),
        condition: "exposed".to_string(),
        severity: SituationSeverity::Soft,
        source_action: "sneak".to_string(),
        clears_on: vec![
            "hide_success".to_string(),
            "flee_success".to_string(),
            "scene_change".to_string(),
        ],
        narrative_hint: "Player is exposed".to_string(),
    }
}

/// Attach the cyberpunk noir clock rules to a context's system blob.
pub fn with_noir_clocks(mut ctx: ContextPacket) -> ContextPacket {
    ctx.system = json!({ "clock_rules": cyberpunk_noir_clock_rules() });
    ctx
}

/// Attach the Mage-style dice pool rules plus player stats.
pub fn with_mage_rules(mut ctx: ContextPacket, stats: serde_json::Value) -> ContextPacket {
    let mut system = ctx.system.as_object().cloned().unwrap_or_default();
    system.insert("resolution_rules".into(), mage_ascension_resolution_rules());
    ctx.system = serde_json::Value::Object(system);
    for entity in &mut ctx.entities {
        if entity.id == "player" {
            entity.attrs.insert("stats".into(), stats.clone());
        }
    }
    ctx
}
