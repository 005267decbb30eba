use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use super::{decode, encode};
use crate::{Campaign, Result, StateStore};

impl StateStore {
    pub fn create_campaign(
        &self,
        campaign_id: &str,
        name: &str,
        calibration: &Value,
        system: &Value,
        genre_rules: &Value,
    ) -> Result<Campaign> {
        let created_at = self.now();
        self.conn.execute(
            r#"
            INSERT INTO campaigns (id, name, calibration_json, system_json, genre_rules_json, current_turn, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            "#,
            params![
                campaign_id,
                name,
                encode(calibration)?,
                encode(system)?,
                encode(genre_rules)?,
                created_at
            ],
        )?;
        Ok(Campaign {
            id: campaign_id.to_string(),
            name: name.to_string(),
            calibration: calibration.clone(),
            system: system.clone(),
            genre_rules: genre_rules.clone(),
            current_turn: 0,
            created_at,
        })
    }

    pub fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, name, calibration_json, system_json, genre_rules_json, current_turn, created_at
                FROM campaigns WHERE id = ?1
                "#,
                [campaign_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, name, calibration, system, genre_rules, current_turn, created_at)) => {
                Ok(Some(Campaign {
                    id,
                    name,
                    calibration: decode(&calibration)?,
                    system: decode(&system)?,
                    genre_rules: decode(&genre_rules)?,
                    current_turn,
                    created_at,
                }))
            }
            None => Ok(None),
        }
    }

    /// Ensure a campaign row exists, creating a bare one when absent.
    pub fn ensure_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        if let Some(campaign) = self.get_campaign(campaign_id)? {
            return Ok(campaign);
        }
        self.create_campaign(
            campaign_id,
            campaign_id,
            &Value::Object(Default::default()),
            &Value::Object(Default::default()),
            &Value::Object(Default::default()),
        )
    }

    pub fn update_campaign_turn(&self, campaign_id: &str, current_turn: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE campaigns SET current_turn = ?2 WHERE id = ?1",
            params![campaign_id, current_turn],
        )?;
        Ok(())
    }

    pub fn update_campaign_system(&self, campaign_id: &str, system: &Value) -> Result<()> {
        self.conn.execute(
            "UPDATE campaigns SET system_json = ?2 WHERE id = ?1",
            params![campaign_id, encode(system)?],
        )?;
        Ok(())
    }

    pub fn update_campaign_calibration(&self, campaign_id: &str, calibration: &Value) -> Result<()> {
        self.conn.execute(
            "UPDATE campaigns SET calibration_json = ?2 WHERE id = ?1",
            params![campaign_id, encode(calibration)?],
        )?;
        Ok(())
    }
}
