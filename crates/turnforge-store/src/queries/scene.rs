use rusqlite::{params, OptionalExtension, Row};

use super::{decode, encode};
use crate::{Result, StateStore};
use turnforge_types::Scene;

type SceneRow = (String, String, String, String, String, String, String);

fn scene_from_row(row: &Row<'_>) -> rusqlite::Result<SceneRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn build_scene(parts: SceneRow) -> Result<Scene> {
    let (location_id, present_json, time_json, constraints_json, visibility_conditions, noise_level, obscured_json) =
        parts;
    Ok(Scene {
        location_id,
        present_entity_ids: decode(&present_json)?,
        time: decode(&time_json)?,
        constraints: decode(&constraints_json)?,
        visibility_conditions,
        noise_level,
        obscured_entities: decode(&obscured_json)?,
    })
}

const SCENE_COLUMNS: &str = "location_id, present_entity_ids_json, time_json, constraints_json, visibility_conditions, noise_level, obscured_entities_json";

impl StateStore {
    /// Write the singleton scene row, replacing any previous scene.
    pub fn set_scene(&self, scene: &Scene) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO scene (id, location_id, present_entity_ids_json, time_json, constraints_json, visibility_conditions, noise_level, obscured_entities_json)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                location_id = ?1,
                present_entity_ids_json = ?2,
                time_json = ?3,
                constraints_json = ?4,
                visibility_conditions = ?5,
                noise_level = ?6,
                obscured_entities_json = ?7
            "#,
            params![
                scene.location_id,
                encode(&scene.present_entity_ids)?,
                encode(&scene.time)?,
                encode(&scene.constraints)?,
                scene.visibility_conditions,
                scene.noise_level,
                encode(&scene.obscured_entities)?
            ],
        )?;
        Ok(())
    }

    pub fn get_scene(&self) -> Result<Option<Scene>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM scene WHERE id = 1", SCENE_COLUMNS),
                [],
                scene_from_row,
            )
            .optional()?;
        row.map(build_scene).transpose()
    }

    pub fn update_scene_entities(&self, present_entity_ids: &[String]) -> Result<()> {
        self.conn.execute(
            "UPDATE scene SET present_entity_ids_json = ?1 WHERE id = 1",
            params![encode(&present_entity_ids)?],
        )?;
        Ok(())
    }
}
