use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;

use super::{decode, encode, enum_from_str, enum_to_str};
use crate::{Result, StateStore};
use turnforge_types::Entity;

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn build_entity(parts: (String, String, String, String, String)) -> Result<Entity> {
    let (id, kind, name, attrs_json, tags_json) = parts;
    Ok(Entity {
        id,
        kind: enum_from_str(&kind)?,
        name,
        attrs: decode(&attrs_json)?,
        tags: decode(&tags_json)?,
    })
}

impl StateStore {
    pub fn create_entity(&self, entity: &Entity) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO entities (id, kind, name, attrs_json, tags_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                entity.id,
                enum_to_str(&entity.kind)?,
                entity.name,
                encode(&entity.attrs)?,
                encode(&entity.tags)?
            ],
        )?;
        Ok(())
    }

    pub fn get_entity(&self, entity_id: &str) -> Result<Option<Entity>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, kind, name, attrs_json, tags_json FROM entities WHERE id = ?1",
                [entity_id],
                entity_from_row,
            )
            .optional()?;
        row.map(build_entity).transpose()
    }

    pub fn get_entities_by_kind(&self, kind: &str) -> Result<Vec<Entity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, name, attrs_json, tags_json FROM entities WHERE kind = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([kind], entity_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_entity).collect()
    }

    pub fn get_entities_by_ids(&self, ids: &[String]) -> Result<Vec<Entity>> {
        let mut entities = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = self.get_entity(id)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    pub fn get_all_entities(&self) -> Result<Vec<Entity>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, kind, name, attrs_json, tags_json FROM entities ORDER BY id")?;
        let rows = stmt
            .query_map([], entity_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_entity).collect()
    }

    /// Partial update; omitted fields keep their stored values.
    pub fn update_entity(
        &self,
        entity_id: &str,
        name: Option<&str>,
        attrs: Option<&serde_json::Map<String, Value>>,
        tags: Option<&[String]>,
    ) -> Result<()> {
        if let Some(name) = name {
            self.conn.execute(
                "UPDATE entities SET name = ?2 WHERE id = ?1",
                params![entity_id, name],
            )?;
        }
        if let Some(attrs) = attrs {
            self.conn.execute(
                "UPDATE entities SET attrs_json = ?2 WHERE id = ?1",
                params![entity_id, encode(attrs)?],
            )?;
        }
        if let Some(tags) = tags {
            self.conn.execute(
                "UPDATE entities SET tags_json = ?2 WHERE id = ?1",
                params![entity_id, encode(&tags)?],
            )?;
        }
        Ok(())
    }

    pub fn delete_entity(&self, entity_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM entities WHERE id = ?1", [entity_id])?;
        Ok(())
    }
}
