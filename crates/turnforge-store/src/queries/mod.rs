mod campaign;
mod clock;
mod entity;
mod event;
mod fact;
mod inventory;
mod pack;
mod relationship;
mod scene;
mod session;
mod thread;

pub use pack::PackChunkMatch;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Result;

/// Encode a structured column in canonical form (sorted keys, compact,
/// ASCII) so stored rows are byte-reproducible.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(turnforge_types::to_canonical_json(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(s: &str) -> Result<T> {
    Ok(serde_json::from_str(s)?)
}

/// Serialize a unit enum (snake_case serde) to its bare string form.
pub(crate) fn enum_to_str<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

pub(crate) fn enum_from_str<T: DeserializeOwned>(s: &str) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(
        s.to_string(),
    ))?)
}
