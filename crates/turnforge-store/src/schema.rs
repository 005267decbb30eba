use rusqlite::Connection;

use crate::Result;

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 1;

// NOTE: Storage Design Rationale
//
// Why JSON columns for structured fields?
// - Attrs, fact objects, calibration and system blobs are open-ended by
//   design; campaigns vary by data, not schema
// - All JSON is written in canonical form (sorted keys, compact, ASCII)
//   so stored diffs and event records are byte-reproducible for replay
//
// Why UNIQUE(campaign_id, turn_no) on events?
// - The turn counter is the ordering backbone of a campaign; a duplicate
//   append must fail loudly rather than fork history
//
// Why a singleton scene row?
// - One store file holds one campaign's world; the scene is "where the
//   camera is" and there is exactly one camera

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != 0 && current_version != SCHEMA_VERSION {
        return Err(crate::Error::Schema(format!(
            "Store schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            calibration_json TEXT NOT NULL DEFAULT '{}',
            system_json TEXT NOT NULL DEFAULT '{}',
            genre_rules_json TEXT NOT NULL DEFAULT '{}',
            current_turn INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entities (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            name TEXT NOT NULL,
            attrs_json TEXT NOT NULL DEFAULT '{}',
            tags_json TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS facts (
            id TEXT PRIMARY KEY,
            subject_id TEXT NOT NULL,
            predicate TEXT NOT NULL,
            object_json TEXT NOT NULL,
            visibility TEXT NOT NULL DEFAULT 'known',
            confidence REAL NOT NULL DEFAULT 1.0,
            tags_json TEXT NOT NULL DEFAULT '[]',
            discovered_turn INTEGER,
            discovery_method TEXT
        );

        CREATE TABLE IF NOT EXISTS scene (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            location_id TEXT NOT NULL,
            present_entity_ids_json TEXT NOT NULL DEFAULT '[]',
            time_json TEXT NOT NULL DEFAULT '{}',
            constraints_json TEXT NOT NULL DEFAULT '{}',
            visibility_conditions TEXT NOT NULL DEFAULT 'normal',
            noise_level TEXT NOT NULL DEFAULT 'normal',
            obscured_entities_json TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS clocks (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            value INTEGER NOT NULL,
            max_value INTEGER NOT NULL,
            triggers_json TEXT NOT NULL DEFAULT '{}',
            tags_json TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS inventory (
            owner_id TEXT NOT NULL,
            item_id TEXT NOT NULL,
            qty INTEGER NOT NULL,
            flags_json TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (owner_id, item_id)
        );

        CREATE TABLE IF NOT EXISTS relationships (
            a_id TEXT NOT NULL,
            b_id TEXT NOT NULL,
            rel_type TEXT NOT NULL,
            intensity INTEGER NOT NULL DEFAULT 0,
            notes_json TEXT NOT NULL DEFAULT 'null',
            PRIMARY KEY (a_id, b_id, rel_type)
        );

        CREATE TABLE IF NOT EXISTS threads (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            stakes_json TEXT NOT NULL DEFAULT 'null',
            related_entity_ids_json TEXT NOT NULL DEFAULT '[]',
            tags_json TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            campaign_id TEXT NOT NULL,
            turn_no INTEGER NOT NULL,
            player_input TEXT NOT NULL,
            context_packet_json TEXT NOT NULL,
            pass_outputs_json TEXT NOT NULL,
            engine_events_json TEXT NOT NULL,
            state_diff_json TEXT NOT NULL,
            final_text TEXT NOT NULL,
            prompt_versions_json TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (campaign_id, turn_no)
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            campaign_id TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            turn_start INTEGER NOT NULL DEFAULT 0,
            turn_end INTEGER
        );

        CREATE TABLE IF NOT EXISTS content_packs (
            id TEXT PRIMARY KEY,
            campaign_id TEXT NOT NULL,
            title TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pack_chunks (
            id TEXT PRIMARY KEY,
            pack_id TEXT NOT NULL,
            campaign_id TEXT NOT NULL,
            chunk_index INTEGER NOT NULL DEFAULT 0,
            content TEXT NOT NULL,
            tags_json TEXT NOT NULL DEFAULT '[]',
            FOREIGN KEY (pack_id) REFERENCES content_packs(id)
        );

        CREATE VIRTUAL TABLE IF NOT EXISTS pack_chunks_fts USING fts5(
            content,
            chunk_id UNINDEXED,
            campaign_id UNINDEXED
        );

        CREATE INDEX IF NOT EXISTS idx_facts_subject ON facts(subject_id);
        CREATE INDEX IF NOT EXISTS idx_facts_visibility ON facts(visibility);
        CREATE INDEX IF NOT EXISTS idx_events_campaign_turn ON events(campaign_id, turn_no DESC);
        CREATE INDEX IF NOT EXISTS idx_inventory_owner ON inventory(owner_id);
        CREATE INDEX IF NOT EXISTS idx_chunks_pack ON pack_chunks(pack_id);
        "#,
    )
    .map_err(|e| crate::Error::Schema(e.to_string()))?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}
