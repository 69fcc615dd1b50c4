//! Tag index maintenance and search
//!
//! The index always reflects each record's current tag set: every save fully
//! replaces the indexed tags inside the save transaction, so readers see the
//! pre-write or post-write set, never a partial one.

use rusqlite::{params, Connection, ToSql};
use std::collections::BTreeSet;
use tracing::debug;

use super::AssetRegistry;
use crate::asset::AssetMetadata;
use crate::error::Result;
use crate::ids::AssetId;

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS asset_tags (
            asset_id TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (asset_id, tag)
        );

        CREATE INDEX IF NOT EXISTS idx_asset_tags_tag ON asset_tags(tag);
        "#,
    )?;
    Ok(())
}

/// Replace everything indexed for `id` with its current tag set.
/// Callers hold the save transaction.
pub(crate) fn replace_tags(
    conn: &Connection,
    id: &AssetId,
    tags: &BTreeSet<String>,
) -> Result<()> {
    conn.execute("DELETE FROM asset_tags WHERE asset_id = ?1", params![id])?;
    let mut stmt = conn.prepare("INSERT INTO asset_tags (asset_id, tag) VALUES (?1, ?2)")?;
    for tag in tags {
        stmt.execute(params![id, tag])?;
    }
    Ok(())
}

/// One search result: the asset's identity plus its envelope metadata
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: AssetId,
    pub asset_type: String,
    pub metadata: AssetMetadata,
}

impl AssetRegistry {
    /// Search assets by type and/or tags.
    ///
    /// `tags` uses AND semantics: a record matches only if it carries every
    /// listed tag. Results are ordered by creation time then id, so paging
    /// with a growing `offset` neither skips nor repeats records.
    pub fn search(
        &self,
        asset_type: Option<&str>,
        tags: &[&str],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchHit>> {
        let mut sql = String::from("SELECT a.id, a.type, a.metadata FROM assets a");
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if !tags.is_empty() {
            sql.push_str(" JOIN asset_tags t ON a.id = t.asset_id");
        }
        if let Some(kind) = asset_type.as_ref() {
            sql.push_str(" WHERE a.type = ?");
            params.push(kind);
        }
        if !tags.is_empty() {
            sql.push_str(if asset_type.is_some() { " AND " } else { " WHERE " });
            sql.push_str(&format!("t.tag IN ({})", vec!["?"; tags.len()].join(", ")));
            for tag in tags {
                params.push(tag);
            }
            sql.push_str(&format!(
                " GROUP BY a.id HAVING COUNT(DISTINCT t.tag) = {}",
                tags.len()
            ));
        }

        let limit = limit as i64;
        let offset = offset as i64;
        sql.push_str(" ORDER BY a.created_at, a.id LIMIT ? OFFSET ?");
        params.push(&limit);
        params.push(&offset);

        let conn = self.conn().lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(&params[..], |row| {
            Ok((
                row.get::<_, AssetId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (id, kind, metadata_json) = row?;
            hits.push(SearchHit {
                id,
                asset_type: kind,
                metadata: serde_json::from_str(&metadata_json)?,
            });
        }
        debug!(count = hits.len(), ?asset_type, ?tags, "searched assets");
        Ok(hits)
    }
}
