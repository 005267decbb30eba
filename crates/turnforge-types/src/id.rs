use uuid::Uuid;

/// Fresh event record id.
pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fresh fact id (short hex, prefixed for greppability in stored JSON).
pub fn new_fact_id() -> String {
    format!("fact_{}", short_hex())
}

/// Fresh situation fact id.
pub fn new_situation_id() -> String {
    format!("situation_{}", short_hex())
}

fn short_hex() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}
