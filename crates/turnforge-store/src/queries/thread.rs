use rusqlite::{params, OptionalExtension, Row};

use super::{decode, encode, enum_from_str, enum_to_str};
use crate::{Result, StateStore};
use turnforge_types::{Thread, ThreadStatus};

fn thread_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn build_thread(parts: (String, String, String, String, String, String)) -> Result<Thread> {
    let (id, title, status, stakes_json, related_json, tags_json) = parts;
    Ok(Thread {
        id,
        title,
        status: enum_from_str(&status)?,
        stakes: decode(&stakes_json)?,
        related_entity_ids: decode(&related_json)?,
        tags: decode(&tags_json)?,
    })
}

const THREAD_COLUMNS: &str = "id, title, status, stakes_json, related_entity_ids_json, tags_json";

impl StateStore {
    pub fn create_thread(&self, thread: &Thread) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO threads (id, title, status, stakes_json, related_entity_ids_json, tags_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                thread.id,
                thread.title,
                enum_to_str(&thread.status)?,
                encode(&thread.stakes)?,
                encode(&thread.related_entity_ids)?,
                encode(&thread.tags)?
            ],
        )?;
        Ok(())
    }

    pub fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM threads WHERE id = ?1", THREAD_COLUMNS),
                [thread_id],
                thread_from_row,
            )
            .optional()?;
        row.map(build_thread).transpose()
    }

    pub fn get_active_threads(&self) -> Result<Vec<Thread>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM threads WHERE status = 'active' ORDER BY id",
            THREAD_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], thread_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_thread).collect()
    }

    pub fn update_thread(
        &self,
        thread_id: &str,
        status: Option<ThreadStatus>,
        title: Option<&str>,
    ) -> Result<()> {
        if let Some(status) = status {
            self.conn.execute(
                "UPDATE threads SET status = ?2 WHERE id = ?1",
                params![thread_id, enum_to_str(&status)?],
            )?;
        }
        if let Some(title) = title {
            self.conn.execute(
                "UPDATE threads SET title = ?2 WHERE id = ?1",
                params![thread_id, title],
            )?;
        }
        Ok(())
    }
}
