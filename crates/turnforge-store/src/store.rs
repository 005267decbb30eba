use rusqlite::Connection;
use std::path::Path;

use crate::{schema, Result};

/// SQLite-backed state store. Every public operation either fully succeeds
/// or leaves the store unchanged; multi-row operations run in transactions.
///
/// A store file holds one campaign's world state (entities, facts, scene,
/// clocks, inventory) plus the per-campaign event log, sessions, and lore
/// pack chunks.
pub struct StateStore {
    pub(crate) conn: Connection,
}

impl StateStore {
    /// Open (or create) a store at the given path and ensure the schema.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// In-memory store for tests and replay sandboxes.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<()> {
        schema::init_schema(&self.conn)
    }

    pub(crate) fn now(&self) -> String {
        chrono::Utc::now().to_rfc3339()
    }
}
