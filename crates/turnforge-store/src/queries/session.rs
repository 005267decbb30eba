use rusqlite::{params, OptionalExtension, Row};

use crate::{Result, Session, StateStore};

type SessionRow = (String, String, String, Option<String>, i64, Option<i64>);

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn build_session(parts: SessionRow) -> Session {
    let (id, campaign_id, started_at, ended_at, turn_start, turn_end) = parts;
    Session {
        id,
        campaign_id,
        started_at,
        ended_at,
        turn_start,
        turn_end,
    }
}

impl StateStore {
    /// Open a play session, recording the turn it starts from.
    pub fn open_session(&self, campaign_id: &str) -> Result<Session> {
        let id = turnforge_types::new_event_id();
        let started_at = self.now();
        let turn_start = self.get_next_turn_no(campaign_id)? - 1;
        self.conn.execute(
            r#"
            INSERT INTO sessions (id, campaign_id, started_at, turn_start)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![id, campaign_id, started_at, turn_start],
        )?;
        Ok(Session {
            id,
            campaign_id: campaign_id.to_string(),
            started_at,
            ended_at: None,
            turn_start,
            turn_end: None,
        })
    }

    pub fn close_session(&self, session_id: &str, turn_end: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions SET ended_at = ?2, turn_end = ?3 WHERE id = ?1",
            params![session_id, self.now(), turn_end],
        )?;
        Ok(())
    }

    pub fn get_latest_session(&self, campaign_id: &str) -> Result<Option<Session>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, campaign_id, started_at, ended_at, turn_start, turn_end
                FROM sessions WHERE campaign_id = ?1
                ORDER BY started_at DESC LIMIT 1
                "#,
                [campaign_id],
                session_from_row,
            )
            .optional()?;
        Ok(row.map(build_session))
    }
}
