//! Dependency edges between assets
//!
//! Edges are directed `source -> target` triples with an open `kind` label
//! ("requires", "references", ...). One cycle-safe traversal backs both
//! recursive dependency queries and cascade delete.

use rusqlite::{params, Connection};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use super::AssetRegistry;
use crate::error::Result;
use crate::ids::AssetId;

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS asset_dependencies (
            source_id TEXT NOT NULL,
            target_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            PRIMARY KEY (source_id, target_id, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_asset_dependencies_source ON asset_dependencies(source_id);
        CREATE INDEX IF NOT EXISTS idx_asset_dependencies_target ON asset_dependencies(target_id);
        "#,
    )?;
    Ok(())
}

const OUT_EDGES: &str = "SELECT target_id FROM asset_dependencies WHERE source_id = ?1";
const IN_EDGES: &str = "SELECT source_id FROM asset_dependencies WHERE target_id = ?1";

/// Walk the graph from `start` along `edge_sql`, recording each newly
/// discovered id in discovery order. Cycle-safe via the visited set;
/// `start` itself is never part of the result.
fn traverse(conn: &Connection, start: &AssetId, edge_sql: &str) -> Result<Vec<AssetId>> {
    let mut stmt = conn.prepare(edge_sql)?;
    let mut visited: HashSet<AssetId> = HashSet::from([start.clone()]);
    let mut order = Vec::new();
    let mut stack = vec![start.clone()];

    while let Some(current) = stack.pop() {
        let neighbors: Vec<AssetId> = stmt
            .query_map(params![current], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        for neighbor in neighbors {
            if visited.insert(neighbor.clone()) {
                order.push(neighbor.clone());
                stack.push(neighbor);
            }
        }
    }
    Ok(order)
}

/// Ids with an edge targeting `id`, sorted
pub(crate) fn direct_dependents(conn: &Connection, id: &AssetId) -> Result<Vec<AssetId>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT source_id FROM asset_dependencies WHERE target_id = ?1 ORDER BY source_id")?;
    let dependents = stmt
        .query_map(params![id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<AssetId>>>()?;
    Ok(dependents)
}

/// Every id transitively depending on `id`, in discovery order
pub(crate) fn collect_dependents(conn: &Connection, id: &AssetId) -> Result<Vec<AssetId>> {
    traverse(conn, id, IN_EDGES)
}

impl AssetRegistry {
    /// Record that `source` depends on `target`.
    ///
    /// Idempotent: re-adding an identical `(source, target, kind)` triple is
    /// a no-op. The target is not required to exist; an edge to an unknown
    /// id is kept and simply never resolves to a record.
    pub fn add_dependency(&self, source: &AssetId, target: &AssetId, kind: &str) -> Result<()> {
        let conn = self.conn().lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO asset_dependencies (source_id, target_id, kind) VALUES (?1, ?2, ?3)",
            params![source, target, kind],
        )?;
        debug!(source = %source, target = %target, kind, "added dependency");
        Ok(())
    }

    /// Ids that `id` depends on.
    ///
    /// Non-recursive returns direct out-edge targets; recursive returns the
    /// full transitive closure, excluding `id` itself, and terminates on
    /// cyclic graphs.
    pub fn get_dependencies(&self, id: &AssetId, recursive: bool) -> Result<BTreeSet<AssetId>> {
        let conn = self.conn().lock().unwrap();
        if recursive {
            Ok(traverse(&conn, id, OUT_EDGES)?.into_iter().collect())
        } else {
            let mut stmt = conn.prepare(OUT_EDGES)?;
            let targets = stmt
                .query_map(params![id], |row| row.get(0))?
                .collect::<rusqlite::Result<BTreeSet<AssetId>>>()?;
            Ok(targets)
        }
    }

    /// Ids of the given type (or all types) that no edge targets
    pub fn find_orphans(&self, asset_type: Option<&str>) -> Result<BTreeSet<AssetId>> {
        let conn = self.conn().lock().unwrap();
        let mut sql = String::from(
            "SELECT id FROM assets
             WHERE id NOT IN (SELECT DISTINCT target_id FROM asset_dependencies)",
        );
        if asset_type.is_some() {
            sql.push_str(" AND type = ?1");
        }

        let mut stmt = conn.prepare(&sql)?;
        let orphans = match asset_type {
            Some(kind) => stmt
                .query_map(params![kind], |row| row.get(0))?
                .collect::<rusqlite::Result<BTreeSet<AssetId>>>()?,
            None => stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<BTreeSet<AssetId>>>()?,
        };
        Ok(orphans)
    }
}
