use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;

use super::{decode, encode, enum_from_str, enum_to_str};
use crate::{Result, StateStore};
use turnforge_types::{Fact, Visibility};

type FactRow = (
    String,
    String,
    String,
    String,
    String,
    f64,
    String,
    Option<i64>,
    Option<String>,
);

fn fact_from_row(row: &Row<'_>) -> rusqlite::Result<FactRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn build_fact(parts: FactRow) -> Result<Fact> {
    let (id, subject_id, predicate, object_json, visibility, confidence, tags_json, discovered_turn, discovery_method) =
        parts;
    Ok(Fact {
        id,
        subject_id,
        predicate,
        object: decode(&object_json)?,
        visibility: enum_from_str(&visibility)?,
        confidence,
        tags: decode(&tags_json)?,
        discovered_turn,
        discovery_method,
    })
}

const FACT_COLUMNS: &str = "id, subject_id, predicate, object_json, visibility, confidence, tags_json, discovered_turn, discovery_method";

impl StateStore {
    pub fn create_fact(&self, fact: &Fact) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO facts (id, subject_id, predicate, object_json, visibility, confidence, tags_json, discovered_turn, discovery_method)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                fact.id,
                fact.subject_id,
                fact.predicate,
                encode(&fact.object)?,
                enum_to_str(&fact.visibility)?,
                fact.confidence,
                encode(&fact.tags)?,
                fact.discovered_turn,
                fact.discovery_method
            ],
        )?;
        Ok(())
    }

    pub fn get_fact(&self, fact_id: &str) -> Result<Option<Fact>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM facts WHERE id = ?1", FACT_COLUMNS),
                [fact_id],
                fact_from_row,
            )
            .optional()?;
        row.map(build_fact).transpose()
    }

    pub fn get_facts_for_subject(&self, subject_id: &str) -> Result<Vec<Fact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM facts WHERE subject_id = ?1 ORDER BY id",
            FACT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([subject_id], fact_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_fact).collect()
    }

    pub fn get_known_facts(&self) -> Result<Vec<Fact>> {
        self.get_facts_by_visibility(Visibility::Known)
    }

    pub fn get_facts_by_visibility(&self, visibility: Visibility) -> Result<Vec<Fact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM facts WHERE visibility = ?1 ORDER BY id",
            FACT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([enum_to_str(&visibility)?], fact_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_fact).collect()
    }

    pub fn get_all_facts(&self) -> Result<Vec<Fact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM facts ORDER BY id", FACT_COLUMNS))?;
        let rows = stmt
            .query_map([], fact_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_fact).collect()
    }

    /// Update a fact's object and/or visibility.
    ///
    /// A known fact never goes back to world visibility; such a request is
    /// ignored for the visibility part.
    pub fn update_fact(
        &self,
        fact_id: &str,
        object: Option<&Value>,
        visibility: Option<Visibility>,
    ) -> Result<()> {
        if let Some(object) = object {
            self.conn.execute(
                "UPDATE facts SET object_json = ?2 WHERE id = ?1",
                params![fact_id, encode(object)?],
            )?;
        }
        if let Some(visibility) = visibility {
            if visibility == Visibility::World {
                self.conn.execute(
                    "UPDATE facts SET visibility = ?2 WHERE id = ?1 AND visibility = 'world'",
                    params![fact_id, enum_to_str(&visibility)?],
                )?;
            } else {
                self.conn.execute(
                    "UPDATE facts SET visibility = ?2 WHERE id = ?1",
                    params![fact_id, enum_to_str(&visibility)?],
                )?;
            }
        }
        Ok(())
    }

    /// Promote a world fact to known, recording when and how it surfaced.
    pub fn mark_fact_discovered(&self, fact_id: &str, turn_no: i64, method: &str) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE facts SET visibility = 'known', discovered_turn = ?2, discovery_method = ?3
            WHERE id = ?1
            "#,
            params![fact_id, turn_no, method],
        )?;
        Ok(())
    }
}
