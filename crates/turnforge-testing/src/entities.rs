use serde_json::json;
use turnforge_types::{Entity, EntityKind};

/// The player character entity used across fixtures.
pub fn make_player(name: &str) -> Entity {
    let mut player = Entity::new("player", EntityKind::Pc, name);
    player
        .attrs
        .insert("background".into(), json!("Drifter with a past"));
    player.tags.push("player".into());
    player
}

pub fn make_npc(id: &str, name: &str, role: &str, description: &str) -> Entity {
    let mut npc = Entity::new(id, EntityKind::Npc, name);
    npc.attrs.insert("role".into(), json!(role));
    npc.attrs.insert("description".into(), json!(description));
    npc
}

pub fn make_location(id: &str, name: &str, description: &str) -> Entity {
    let mut location = Entity::new(id, EntityKind::Location, name);
    location
        .attrs
        .insert("description".into(), json!(description));
    location
}
