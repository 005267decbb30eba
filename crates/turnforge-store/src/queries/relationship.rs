use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;

use super::{decode, encode};
use crate::{Result, StateStore};
use turnforge_types::Relationship;

fn rel_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, i64, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn build_rel(parts: (String, String, String, i64, String)) -> Result<Relationship> {
    let (a_id, b_id, rel_type, intensity, notes_json) = parts;
    Ok(Relationship {
        a_id,
        b_id,
        rel_type,
        intensity,
        notes: decode(&notes_json)?,
    })
}

const REL_COLUMNS: &str = "a_id, b_id, rel_type, intensity, notes_json";

impl StateStore {
    pub fn create_relationship(
        &self,
        a_id: &str,
        b_id: &str,
        rel_type: &str,
        intensity: i64,
        notes: Option<&Value>,
    ) -> Result<Relationship> {
        let notes_json = match notes {
            Some(notes) => encode(notes)?,
            None => "null".to_string(),
        };
        self.conn.execute(
            r#"
            INSERT INTO relationships (a_id, b_id, rel_type, intensity, notes_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(a_id, b_id, rel_type) DO UPDATE SET
                intensity = ?4,
                notes_json = ?5
            "#,
            params![a_id, b_id, rel_type, intensity, notes_json],
        )?;
        Ok(Relationship {
            a_id: a_id.to_string(),
            b_id: b_id.to_string(),
            rel_type: rel_type.to_string(),
            intensity,
            notes: notes.cloned().unwrap_or(Value::Null),
        })
    }

    pub fn get_relationship(
        &self,
        a_id: &str,
        b_id: &str,
        rel_type: &str,
    ) -> Result<Option<Relationship>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM relationships WHERE a_id = ?1 AND b_id = ?2 AND rel_type = ?3",
                    REL_COLUMNS
                ),
                [a_id, b_id, rel_type],
                rel_from_row,
            )
            .optional()?;
        row.map(build_rel).transpose()
    }

    /// Relationships touching the entity in either direction.
    pub fn get_relationships_for_entity(&self, entity_id: &str) -> Result<Vec<Relationship>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM relationships WHERE a_id = ?1 OR b_id = ?1 ORDER BY a_id, b_id, rel_type",
            REL_COLUMNS
        ))?;
        let rows = stmt
            .query_map([entity_id], rel_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_rel).collect()
    }

    /// Adjust intensity by a delta, creating the row at the delta when the
    /// pair has no prior relationship.
    pub fn update_relationship_intensity(
        &self,
        a_id: &str,
        b_id: &str,
        rel_type: &str,
        delta: i64,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO relationships (a_id, b_id, rel_type, intensity)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(a_id, b_id, rel_type) DO UPDATE SET
                intensity = intensity + ?4
            "#,
            params![a_id, b_id, rel_type, delta],
        )?;
        Ok(())
    }
}
