use rusqlite::{params, OptionalExtension, Row};

use super::{decode, encode};
use crate::{Result, StateStore};
use turnforge_types::Clock;

fn clock_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, i64, i64, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn build_clock(parts: (String, String, i64, i64, String, String)) -> Result<Clock> {
    let (id, name, value, max, triggers_json, tags_json) = parts;
    Ok(Clock {
        id,
        name,
        value,
        max,
        triggers: decode(&triggers_json)?,
        tags: decode(&tags_json)?,
    })
}

const CLOCK_COLUMNS: &str = "id, name, value, max_value, triggers_json, tags_json";

impl StateStore {
    pub fn create_clock(&self, clock: &Clock) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO clocks (id, name, value, max_value, triggers_json, tags_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                clock.id,
                clock.name,
                clock.value.clamp(0, clock.max),
                clock.max,
                encode(&clock.triggers)?,
                encode(&clock.tags)?
            ],
        )?;
        Ok(())
    }

    pub fn get_clock(&self, clock_id: &str) -> Result<Option<Clock>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM clocks WHERE id = ?1", CLOCK_COLUMNS),
                [clock_id],
                clock_from_row,
            )
            .optional()?;
        row.map(build_clock).transpose()
    }

    pub fn get_clock_by_name(&self, name: &str) -> Result<Option<Clock>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM clocks WHERE name = ?1", CLOCK_COLUMNS),
                [name],
                clock_from_row,
            )
            .optional()?;
        row.map(build_clock).transpose()
    }

    pub fn get_all_clocks(&self) -> Result<Vec<Clock>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM clocks ORDER BY id", CLOCK_COLUMNS))?;
        let rows = stmt
            .query_map([], clock_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_clock).collect()
    }

    /// Set a clock to an absolute value, clamped to `0..=max`. Returns the
    /// trigger effects whose thresholds were crossed upward.
    pub fn update_clock(&self, clock_id: &str, value: i64) -> Result<Vec<String>> {
        let Some(clock) = self.get_clock(clock_id)? else {
            return Ok(Vec::new());
        };
        let new_value = value.clamp(0, clock.max);
        self.conn.execute(
            "UPDATE clocks SET value = ?2 WHERE id = ?1",
            params![clock_id, new_value],
        )?;
        Ok(clock.crossed_triggers(clock.value, new_value))
    }

    /// Adjust a clock by a delta, clamped. Unknown clocks are a silent
    /// no-op so config-driven effects can reference clocks a campaign has
    /// not enabled.
    pub fn adjust_clock(&self, clock_id: &str, delta: i64) -> Result<Vec<String>> {
        let Some(clock) = self.get_clock(clock_id)? else {
            return Ok(Vec::new());
        };
        self.update_clock(clock_id, clock.value + delta)
    }
}
