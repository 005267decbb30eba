use serde_json::Value;
use turnforge_types::{Fact, Visibility};

pub fn make_known_fact(id: &str, subject_id: &str, predicate: &str, object: Value) -> Fact {
    make_fact(id, subject_id, predicate, object, Visibility::Known)
}

/// A fact that exists in the world but is hidden from the player until
/// discovered.
pub fn make_world_fact(id: &str, subject_id: &str, predicate: &str, object: Value) -> Fact {
    make_fact(id, subject_id, predicate, object, Visibility::World)
}

fn make_fact(
    id: &str,
    subject_id: &str,
    predicate: &str,
    object: Value,
    visibility: Visibility,
) -> Fact {
    Fact {
        id: id.to_string(),
        subject_id: subject_id.to_string(),
        predicate: predicate.to_string(),
        object,
        visibility,
        confidence: 1.0,
        tags: vec![],
        discovered_turn: None,
        discovery_method: None,
    }
}
