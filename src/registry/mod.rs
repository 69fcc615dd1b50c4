//! SQLite-backed asset registry
//!
//! `AssetRegistry` is the single entry point consumers use: scene and UI
//! layers save and browse records, the scheduler reads character records,
//! and generative adapters register produced media and link it to its owner.
//! Create one registry and share clones of the handle; all clones use the
//! same connection and type table.
//!
//! Operations are grouped by submodule:
//! - `records` - versioned save/load and history
//! - `tags` - tag index maintenance and search
//! - `deps` - dependency edges, traversal, orphan detection

use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::contract::{AssetContract, TypeRegistry};
use crate::error::{RegistryError, Result};
use crate::ids::AssetId;

mod deps;
mod records;
mod tags;

pub use tags::SearchHit;

/// Polymorphic, checksum-verified, dependency-aware asset store.
///
/// One registry owns one SQLite database (file-backed or in-memory) and a
/// runtime table of type contracts. Every `save` and `delete` runs as a
/// single transaction; a failed operation leaves no partial state behind.
#[derive(Clone)]
pub struct AssetRegistry {
    conn: Arc<Mutex<Connection>>,
    types: TypeRegistry,
}

impl AssetRegistry {
    /// Open or create a registry database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(&path)?;
        let registry = Self {
            conn: Arc::new(Mutex::new(conn)),
            types: TypeRegistry::new(),
        };
        registry.init_schema()?;
        Ok(registry)
    }

    /// Create an in-memory registry (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let registry = Self {
            conn: Arc::new(Mutex::new(conn)),
            types: TypeRegistry::new(),
        };
        registry.init_schema()?;
        Ok(registry)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        records::init_schema(&conn)?;
        tags::init_schema(&conn)?;
        deps::init_schema(&conn)?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Arc<Mutex<Connection>> {
        &self.conn
    }

    /// Register a type contract; see [`TypeRegistry::register`]
    pub fn register_type(
        &self,
        name: &str,
        contract: Arc<dyn AssetContract>,
        overwrite: bool,
    ) -> Result<()> {
        self.types.register(name, contract, overwrite)
    }

    /// Look up a registered type contract; see [`TypeRegistry::get`]
    pub fn get_type(&self, name: &str) -> Result<Arc<dyn AssetContract>> {
        self.types.get(name)
    }

    /// The registry's type table
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Delete an asset, its version history, its tag entries, and every edge
    /// it appears in.
    ///
    /// With `cascade` false the delete is refused with `DependencyConflict`
    /// if any asset depends on `id`. With `cascade` true every transitive
    /// dependent is removed first, children before parents, all inside one
    /// transaction.
    pub fn delete(&self, id: &AssetId, cascade: bool) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let exists: Option<String> = tx
            .query_row(
                "SELECT id FROM assets WHERE id = ?1",
                rusqlite::params![id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(RegistryError::AssetNotFound {
                id: id.clone(),
                version: None,
            });
        }

        let dependents = deps::direct_dependents(&tx, id)?;
        if !dependents.is_empty() && !cascade {
            return Err(RegistryError::DependencyConflict {
                id: id.clone(),
                dependents,
            });
        }

        let mut removed = 0usize;
        if cascade {
            // Discovery order guarantees a dependent appears after the asset
            // it was reached through, so the reverse walk removes
            // dependents-of-dependents before their parents.
            let order = deps::collect_dependents(&tx, id)?;
            for dependent in order.iter().rev() {
                purge_asset(&tx, dependent)?;
                removed += 1;
            }
        }
        purge_asset(&tx, id)?;
        tx.commit()?;

        info!(asset_id = %id, cascaded = removed, "deleted asset");
        Ok(())
    }

    /// Best-effort aggregate snapshot of the registry's contents
    pub fn stats(&self) -> Result<RegistryStats> {
        let conn = self.conn.lock().unwrap();

        let total_assets: u64 =
            conn.query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;

        let mut by_type = BTreeMap::new();
        let mut stmt = conn.prepare("SELECT type, COUNT(*) FROM assets GROUP BY type")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;
        for row in rows {
            let (kind, count) = row?;
            by_type.insert(kind, count);
        }

        let distinct_tags: u64 =
            conn.query_row("SELECT COUNT(DISTINCT tag) FROM asset_tags", [], |row| {
                row.get(0)
            })?;
        let total_dependencies: u64 =
            conn.query_row("SELECT COUNT(*) FROM asset_dependencies", [], |row| {
                row.get(0)
            })?;
        let total_versions: u64 =
            conn.query_row("SELECT COUNT(*) FROM asset_versions", [], |row| row.get(0))?;

        Ok(RegistryStats {
            total_assets,
            by_type,
            distinct_tags,
            total_dependencies,
            total_versions,
        })
    }
}

/// Registry-wide counters returned by [`AssetRegistry::stats`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryStats {
    pub total_assets: u64,
    pub by_type: BTreeMap<String, u64>,
    pub distinct_tags: u64,
    pub total_dependencies: u64,
    pub total_versions: u64,
}

/// Remove one asset's record, history, tags, and edges in both directions.
/// Callers hold the transaction.
fn purge_asset(conn: &Connection, id: &AssetId) -> Result<()> {
    conn.execute(
        "DELETE FROM asset_dependencies WHERE source_id = ?1 OR target_id = ?1",
        rusqlite::params![id],
    )?;
    conn.execute(
        "DELETE FROM asset_tags WHERE asset_id = ?1",
        rusqlite::params![id],
    )?;
    conn.execute(
        "DELETE FROM asset_versions WHERE asset_id = ?1",
        rusqlite::params![id],
    )?;
    conn.execute("DELETE FROM assets WHERE id = ?1", rusqlite::params![id])?;
    Ok(())
}
