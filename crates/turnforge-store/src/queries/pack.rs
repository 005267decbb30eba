use rusqlite::params;

use crate::{Result, StateStore};

/// A chunk of ingested lore content returned from full-text search.
///
/// The core treats packs opaquely: the ingest pipeline writes them, the
/// context builder reads matches into `lore_context`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackChunkMatch {
    pub chunk_id: String,
    pub pack_id: String,
    pub content: String,
}

impl StateStore {
    pub fn add_content_pack(
        &self,
        pack_id: &str,
        campaign_id: &str,
        title: &str,
        source: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO content_packs (id, campaign_id, title, source, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![pack_id, campaign_id, title, source, self.now()],
        )?;
        Ok(())
    }

    pub fn add_pack_chunk(
        &self,
        chunk_id: &str,
        pack_id: &str,
        campaign_id: &str,
        chunk_index: i64,
        content: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO pack_chunks (id, pack_id, campaign_id, chunk_index, content)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![chunk_id, pack_id, campaign_id, chunk_index, content],
        )?;
        self.conn.execute(
            "INSERT INTO pack_chunks_fts (content, chunk_id, campaign_id) VALUES (?1, ?2, ?3)",
            params![content, chunk_id, campaign_id],
        )?;
        Ok(())
    }

    /// Full-text search over a campaign's pack chunks.
    pub fn search_pack_chunks(
        &self,
        campaign_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PackChunkMatch>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT f.chunk_id, c.pack_id, c.content
            FROM pack_chunks_fts f
            JOIN pack_chunks c ON c.id = f.chunk_id
            WHERE pack_chunks_fts MATCH ?1 AND f.campaign_id = ?2
            ORDER BY rank
            LIMIT ?3
            "#,
        )?;
        let rows = stmt
            .query_map(params![query, campaign_id, limit as i64], |row| {
                Ok(PackChunkMatch {
                    chunk_id: row.get(0)?,
                    pack_id: row.get(1)?,
                    content: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
