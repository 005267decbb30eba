pub mod init;
pub mod replay;
pub mod run_turn;
pub mod show_event;

use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Parse a `{"prompt_id": "vN"}` JSON argument.
pub(crate) fn parse_version_map(raw: Option<&str>) -> Result<BTreeMap<String, String>> {
    match raw {
        Some(raw) => serde_json::from_str(raw)
            .with_context(|| format!("invalid prompt-version JSON: {}", raw)),
        None => Ok(BTreeMap::new()),
    }
}
