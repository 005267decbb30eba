use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;

use super::{decode, encode};
use crate::{Result, StateStore};
use turnforge_types::InventoryRow;

fn row_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, i64, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn build_row(parts: (String, String, i64, String)) -> Result<InventoryRow> {
    let (owner_id, item_id, qty, flags_json) = parts;
    Ok(InventoryRow {
        owner_id,
        item_id,
        qty,
        flags: decode(&flags_json)?,
    })
}

impl StateStore {
    /// Add items to an owner's stack; same items merge quantities.
    pub fn add_inventory(
        &self,
        owner_id: &str,
        item_id: &str,
        qty: i64,
        flags: Option<&serde_json::Map<String, Value>>,
    ) -> Result<InventoryRow> {
        let flags_json = match flags {
            Some(flags) => encode(flags)?,
            None => "{}".to_string(),
        };
        self.conn.execute(
            r#"
            INSERT INTO inventory (owner_id, item_id, qty, flags_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(owner_id, item_id) DO UPDATE SET
                qty = qty + ?3,
                flags_json = CASE WHEN ?5 THEN ?4 ELSE flags_json END
            "#,
            params![owner_id, item_id, qty, flags_json, flags.is_some()],
        )?;
        self.cleanup_depleted(owner_id, item_id)?;
        Ok(self
            .get_inventory_item(owner_id, item_id)?
            .unwrap_or(InventoryRow {
                owner_id: owner_id.to_string(),
                item_id: item_id.to_string(),
                qty: 0,
                flags: serde_json::Map::new(),
            }))
    }

    pub fn get_inventory(&self, owner_id: &str) -> Result<Vec<InventoryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT owner_id, item_id, qty, flags_json FROM inventory WHERE owner_id = ?1 ORDER BY item_id",
        )?;
        let rows = stmt
            .query_map([owner_id], row_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(build_row).collect()
    }

    pub fn get_inventory_item(&self, owner_id: &str, item_id: &str) -> Result<Option<InventoryRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT owner_id, item_id, qty, flags_json FROM inventory WHERE owner_id = ?1 AND item_id = ?2",
                [owner_id, item_id],
                row_from_row,
            )
            .optional()?;
        row.map(build_row).transpose()
    }

    /// Remove items; returns whether any remain afterwards. Rows at zero or
    /// below are deleted.
    pub fn remove_inventory(&self, owner_id: &str, item_id: &str, qty: i64) -> Result<bool> {
        self.conn.execute(
            "UPDATE inventory SET qty = qty - ?3 WHERE owner_id = ?1 AND item_id = ?2",
            params![owner_id, item_id, qty],
        )?;
        self.cleanup_depleted(owner_id, item_id)?;
        Ok(self.get_inventory_item(owner_id, item_id)?.is_some())
    }

    fn cleanup_depleted(&self, owner_id: &str, item_id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM inventory WHERE owner_id = ?1 AND item_id = ?2 AND qty <= 0",
            [owner_id, item_id],
        )?;
        Ok(())
    }
}
