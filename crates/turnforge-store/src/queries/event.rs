use rusqlite::{params, OptionalExtension, Row};

use crate::{Error, Result, StateStore};
use turnforge_types::EventRecord;

type EventRow = (
    String,
    String,
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
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
        row.get(9)?,
        row.get(10)?,
    ))
}

fn build_event(parts: EventRow) -> EventRecord {
    let (
        id,
        campaign_id,
        turn_no,
        player_input,
        context_packet_json,
        pass_outputs_json,
        engine_events_json,
        state_diff_json,
        final_text,
        prompt_versions_json,
        created_at,
    ) = parts;
    EventRecord {
        id,
        campaign_id,
        turn_no,
        player_input,
        context_packet_json,
        pass_outputs_json,
        engine_events_json,
        state_diff_json,
        final_text,
        prompt_versions_json,
        created_at,
    }
}

const EVENT_COLUMNS: &str = "id, campaign_id, turn_no, player_input, context_packet_json, pass_outputs_json, engine_events_json, state_diff_json, final_text, prompt_versions_json, created_at";

impl StateStore {
    /// Next turn number for a campaign: max(turn_no) + 1. Must be called
    /// under the campaign commit lock.
    pub fn get_next_turn_no(&self, campaign_id: &str) -> Result<i64> {
        let max_turn: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(turn_no), 0) FROM events WHERE campaign_id = ?1",
            [campaign_id],
            |row| row.get(0),
        )?;
        Ok(max_turn + 1)
    }

    /// Append an event record. Fails with [`Error::DuplicateTurn`] when the
    /// turn number is already taken for the campaign.
    pub fn append_event(&self, event: &EventRecord) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM events WHERE campaign_id = ?1 AND turn_no = ?2)",
            params![event.campaign_id, event.turn_no],
            |row| row.get(0),
        )?;
        if exists {
            return Err(Error::DuplicateTurn {
                campaign_id: event.campaign_id.clone(),
                turn_no: event.turn_no,
            });
        }

        let created_at = if event.created_at.is_empty() {
            self.now()
        } else {
            event.created_at.clone()
        };
        self.conn.execute(
            r#"
            INSERT INTO events (id, campaign_id, turn_no, player_input, context_packet_json, pass_outputs_json, engine_events_json, state_diff_json, final_text, prompt_versions_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                event.id,
                event.campaign_id,
                event.turn_no,
                event.player_input,
                event.context_packet_json,
                event.pass_outputs_json,
                event.engine_events_json,
                event.state_diff_json,
                event.final_text,
                event.prompt_versions_json,
                created_at
            ],
        )?;
        Ok(())
    }

    pub fn get_event(&self, campaign_id: &str, turn_no: i64) -> Result<Option<EventRecord>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM events WHERE campaign_id = ?1 AND turn_no = ?2",
                    EVENT_COLUMNS
                ),
                params![campaign_id, turn_no],
                event_from_row,
            )
            .optional()?;
        Ok(row.map(build_event))
    }

    pub fn get_events_range(
        &self,
        campaign_id: &str,
        start_turn: i64,
        end_turn: i64,
    ) -> Result<Vec<EventRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM events WHERE campaign_id = ?1 AND turn_no BETWEEN ?2 AND ?3 ORDER BY turn_no ASC",
            EVENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![campaign_id, start_turn, end_turn], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().map(build_event).collect())
    }

    /// The most recent `limit` events, newest first. Backbone of the
    /// failure-streak scan, so it stays bounded.
    pub fn get_recent_events(&self, campaign_id: &str, limit: usize) -> Result<Vec<EventRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM events WHERE campaign_id = ?1 ORDER BY turn_no DESC LIMIT ?2",
            EVENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![campaign_id, limit as i64], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().map(build_event).collect())
    }
}
