//! Versioned record storage: save, load, history
//!
//! The current value of every asset lives in `assets`; each overwrite moves
//! the prior value into `asset_versions` and bumps the version by exactly
//! one. Both tables change inside the same transaction as the tag index.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::AssetRegistry;
use crate::asset::{Asset, AssetMetadata, VersionSnapshot};
use crate::error::{RegistryError, Result};
use crate::helper::{asset_checksum, unix_timestamp};
use crate::ids::AssetId;

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Current value of every asset
        CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            payload TEXT NOT NULL,
            metadata TEXT NOT NULL,
            checksum TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_assets_type ON assets(type);

        -- Prior values, one row per overwritten version; a duplicate
        -- (asset_id, version) bump is a constraint violation.
        CREATE TABLE IF NOT EXISTS asset_versions (
            asset_id TEXT NOT NULL,
            version INTEGER NOT NULL,
            payload TEXT NOT NULL,
            metadata TEXT NOT NULL,
            checksum TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (asset_id, version)
        );
        "#,
    )?;
    Ok(())
}

impl AssetRegistry {
    /// Save an asset, retaining the prior value as a version snapshot.
    ///
    /// Equivalent to [`AssetRegistry::save_with`] with `create_version` true.
    pub fn save(&self, asset: &mut dyn Asset) -> Result<AssetId> {
        self.save_with(asset, true)
    }

    /// Save an asset.
    ///
    /// Validates the record, computes its checksum, and either inserts it at
    /// version 1 or snapshots the prior current value (when `create_version`
    /// is true) and bumps the version by one. The record table, version
    /// history, and tag index all change in one transaction; on error
    /// nothing is applied. The asset's metadata is updated in place with the
    /// assigned version and timestamp.
    pub fn save_with(&self, asset: &mut dyn Asset, create_version: bool) -> Result<AssetId> {
        asset.validate()?;
        let payload = asset.export()?;
        let checksum = asset_checksum(asset.asset_type(), &payload)?;
        let payload_json = serde_json::to_string(&payload)?;
        let id = asset.id().clone();
        let now = unix_timestamp();

        let mut conn = self.conn().lock().unwrap();
        let tx = conn.transaction()?;

        let existing: Option<(i64, String, String, String)> = tx
            .query_row(
                "SELECT version, payload, metadata, checksum FROM assets WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        match existing {
            Some((prior_version, prior_payload, prior_metadata, prior_checksum)) => {
                let next_version = prior_version + 1;
                {
                    let meta = asset.metadata_mut();
                    meta.version = next_version;
                    meta.updated_at = now;
                }

                if create_version {
                    tx.execute(
                        "INSERT INTO asset_versions (asset_id, version, payload, metadata, checksum, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![id, prior_version, prior_payload, prior_metadata, prior_checksum, now],
                    )?;
                }

                let metadata_json = serde_json::to_string(asset.metadata())?;
                tx.execute(
                    "UPDATE assets SET payload = ?1, metadata = ?2, checksum = ?3, updated_at = ?4, version = ?5
                     WHERE id = ?6",
                    params![payload_json, metadata_json, checksum, now, next_version, id],
                )?;

                super::tags::replace_tags(&tx, &id, &asset.metadata().tags)?;
                tx.commit()?;
                info!(asset_id = %id, version = next_version, "updated asset");
            }
            None => {
                asset.metadata_mut().version = 1;
                let metadata_json = serde_json::to_string(asset.metadata())?;
                tx.execute(
                    "INSERT INTO assets (id, type, payload, metadata, checksum, created_at, updated_at, version)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
                    params![
                        id,
                        asset.asset_type(),
                        payload_json,
                        metadata_json,
                        checksum,
                        asset.metadata().created_at,
                        asset.metadata().updated_at,
                    ],
                )?;

                super::tags::replace_tags(&tx, &id, &asset.metadata().tags)?;
                tx.commit()?;
                info!(asset_id = %id, kind = asset.asset_type(), "created asset");
            }
        }

        Ok(id)
    }

    /// Load an asset: the current value, or an exact historical snapshot
    /// when `version` is given.
    ///
    /// The payload checksum is recomputed on every load and compared against
    /// the stored one; a mismatch is reported as corruption, not repaired.
    pub fn load(
        &self,
        asset_type: &str,
        id: &AssetId,
        version: Option<i64>,
    ) -> Result<Box<dyn Asset>> {
        let contract = self.types().get(asset_type)?;

        let conn = self.conn().lock().unwrap();
        let current: Option<(String, String, String, i64)> = conn
            .query_row(
                "SELECT payload, metadata, checksum, version FROM assets
                 WHERE id = ?1 AND type = ?2",
                params![id, asset_type],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let (payload_json, metadata_json, stored_checksum) = match (version, current) {
            (None, Some((payload, metadata, checksum, _))) => (payload, metadata, checksum),
            (Some(v), Some((payload, metadata, checksum, current_version))) if v == current_version => {
                (payload, metadata, checksum)
            }
            (Some(v), _) => {
                let snapshot: Option<(String, String, String)> = conn
                    .query_row(
                        "SELECT v.payload, v.metadata, v.checksum FROM asset_versions v
                         JOIN assets a ON a.id = v.asset_id
                         WHERE v.asset_id = ?1 AND a.type = ?2 AND v.version = ?3",
                        params![id, asset_type, v],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .optional()?;
                snapshot.ok_or_else(|| RegistryError::AssetNotFound {
                    id: id.clone(),
                    version: Some(v),
                })?
            }
            (None, None) => {
                return Err(RegistryError::AssetNotFound {
                    id: id.clone(),
                    version: None,
                })
            }
        };
        drop(conn);

        let payload: serde_json::Value = serde_json::from_str(&payload_json)?;
        let computed = asset_checksum(asset_type, &payload)?;
        if computed != stored_checksum {
            return Err(RegistryError::Integrity {
                id: id.clone(),
                stored: stored_checksum,
                computed,
            });
        }

        let metadata: AssetMetadata = serde_json::from_str(&metadata_json)?;
        let asset = contract.import(id.clone(), metadata, &payload)?;
        debug!(asset_id = %id, kind = asset_type, ?version, "loaded asset");
        Ok(asset)
    }

    /// Retained version snapshots for an asset, oldest first.
    ///
    /// An asset saved once has an empty history; an unknown id is an error.
    pub fn list_versions(&self, id: &AssetId) -> Result<Vec<VersionSnapshot>> {
        let conn = self.conn().lock().unwrap();
        if !asset_row_exists(&conn, id)? {
            return Err(RegistryError::AssetNotFound {
                id: id.clone(),
                version: None,
            });
        }

        let mut stmt = conn.prepare(
            "SELECT version, payload, metadata, checksum, created_at FROM asset_versions
             WHERE asset_id = ?1 ORDER BY version",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (version, payload_json, metadata_json, checksum, created_at) = row?;
            snapshots.push(VersionSnapshot {
                asset_id: id.clone(),
                version,
                payload: serde_json::from_str(&payload_json)?,
                metadata: serde_json::from_str(&metadata_json)?,
                checksum,
                created_at,
            });
        }
        Ok(snapshots)
    }

    /// Check whether an asset currently exists
    pub fn exists(&self, id: &AssetId) -> Result<bool> {
        let conn = self.conn().lock().unwrap();
        asset_row_exists(&conn, id)
    }
}

fn asset_row_exists(conn: &Connection, id: &AssetId) -> Result<bool> {
    let exists: Option<i64> = conn
        .query_row("SELECT 1 FROM assets WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(exists.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{register_builtins, CharacterAsset};

    fn registry() -> AssetRegistry {
        let registry = AssetRegistry::in_memory().unwrap();
        register_builtins(&registry).unwrap();
        registry
    }

    fn stored_checksum(registry: &AssetRegistry, id: &AssetId) -> String {
        let conn = registry.conn().lock().unwrap();
        conn.query_row(
            "SELECT checksum FROM assets WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_first_save_is_version_one() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();

        assert_eq!(emma.metadata().version, 1);
        assert!(registry.exists(&id).unwrap());
        assert!(registry.list_versions(&id).unwrap().is_empty());
    }

    #[test]
    fn test_version_bumps_by_one() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();

        emma.description = "warm and curious".to_string();
        registry.save(&mut emma).unwrap();
        assert_eq!(emma.metadata().version, 2);

        emma.description = "warm, curious, and stubborn".to_string();
        registry.save(&mut emma).unwrap();
        assert_eq!(emma.metadata().version, 3);

        let history = registry.list_versions(&id).unwrap();
        let versions: Vec<i64> = history.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test]
    fn test_historical_snapshot_keeps_prior_value() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        emma.age = Some(24);
        let id = registry.save(&mut emma).unwrap();

        emma.age = Some(25);
        registry.save(&mut emma).unwrap();

        let current = registry.load(CharacterAsset::KIND, &id, None).unwrap();
        let past = registry.load(CharacterAsset::KIND, &id, Some(1)).unwrap();

        let current_age = current.export().unwrap()["age"].as_u64();
        let past_age = past.export().unwrap()["age"].as_u64();
        assert_eq!(current_age, Some(25));
        assert_eq!(past_age, Some(24));
    }

    #[test]
    fn test_load_current_version_by_number() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();
        emma.age = Some(30);
        registry.save(&mut emma).unwrap();

        let loaded = registry.load(CharacterAsset::KIND, &id, Some(2)).unwrap();
        assert_eq!(loaded.metadata().version, 2);
    }

    #[test]
    fn test_load_unknown_id_and_version() {
        let registry = registry();
        let ghost = AssetId::from_string("ghost");
        let err = registry.load(CharacterAsset::KIND, &ghost, None).unwrap_err();
        assert!(matches!(err, RegistryError::AssetNotFound { version: None, .. }));

        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();
        let err = registry.load(CharacterAsset::KIND, &id, Some(9)).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::AssetNotFound { version: Some(9), .. }
        ));
    }

    #[test]
    fn test_load_wrong_type_is_not_found() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();

        let err = registry.load("scene", &id, None).unwrap_err();
        assert!(matches!(err, RegistryError::AssetNotFound { .. }));
    }

    #[test]
    fn test_load_unregistered_type() {
        let registry = AssetRegistry::in_memory().unwrap();
        let err = registry
            .load("character", &AssetId::from_string("a"), None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::TypeNotRegistered(_)));
    }

    #[test]
    fn test_checksum_tracks_payload_not_metadata() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();
        let initial = stored_checksum(&registry, &id);

        emma.metadata_mut().add_tag("featured");
        registry.save(&mut emma).unwrap();
        assert_eq!(stored_checksum(&registry, &id), initial);

        emma.age = Some(31);
        registry.save(&mut emma).unwrap();
        assert_ne!(stored_checksum(&registry, &id), initial);
    }

    #[test]
    fn test_save_without_history() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();

        emma.age = Some(26);
        registry.save_with(&mut emma, false).unwrap();

        assert_eq!(emma.metadata().version, 2);
        assert!(registry.list_versions(&id).unwrap().is_empty());
    }

    #[test]
    fn test_validation_failure_saves_nothing() {
        let registry = registry();
        let mut nameless = CharacterAsset::new("");
        let id = nameless.id().clone();

        let err = registry.save(&mut nameless).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));
        assert!(!registry.exists(&id).unwrap());
    }

    #[test]
    fn test_integrity_error_on_corrupted_payload() {
        let registry = registry();
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();

        {
            let conn = registry.conn().lock().unwrap();
            conn.execute(
                "UPDATE assets SET payload = '{\"name\":\"Mallory\"}' WHERE id = ?1",
                params![id],
            )
            .unwrap();
        }

        let err = registry.load(CharacterAsset::KIND, &id, None).unwrap_err();
        assert!(matches!(err, RegistryError::Integrity { .. }));
    }

    #[test]
    fn test_concurrent_saves_to_same_id_serialize() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(registry());
        let mut emma = CharacterAsset::new("Emma");
        let id = registry.save(&mut emma).unwrap();

        let mut handles = Vec::new();
        for n in 0..4 {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            handles.push(thread::spawn(move || {
                let mut loaded = registry.load(CharacterAsset::KIND, &id, None).unwrap();
                loaded.metadata_mut().add_tag(format!("writer-{n}"));
                registry.save(loaded.as_mut()).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let loaded = registry.load(CharacterAsset::KIND, &id, None).unwrap();
        assert_eq!(loaded.metadata().version, 5);

        let history = registry.list_versions(&id).unwrap();
        let versions: Vec<i64> = history.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![1, 2, 3, 4]);
    }
}
