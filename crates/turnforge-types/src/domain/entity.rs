use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a world entity. Unrecognized kinds collapse to `Other` so that
/// discovered content with new kinds never breaks decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Pc,
    Npc,
    Location,
    Item,
    Faction,
    Other,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Pc => "pc",
            EntityKind::Npc => "npc",
            EntityKind::Location => "location",
            EntityKind::Item => "item",
            EntityKind::Faction => "faction",
            EntityKind::Other => "other",
        }
    }
}

impl From<String> for EntityKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pc" => EntityKind::Pc,
            "npc" => EntityKind::Npc,
            "location" => EntityKind::Location,
            "item" => EntityKind::Item,
            "faction" => EntityKind::Faction,
            _ => EntityKind::Other,
        }
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A world entity: player character, NPC, location, item.
///
/// Entities are created at setup or discovery and mutated only through
/// explicit store updates; nothing aliases them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub attrs: serde_json::Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            attrs: serde_json::Map::new(),
            tags: Vec::new(),
        }
    }

    /// String attribute lookup, None when absent or non-string.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }
}
