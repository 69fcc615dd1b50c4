//! The record contract every asset type implements
//!
//! An asset is a typed payload plus an envelope (id + metadata) the registry
//! manages. Payloads round-trip through `export`/`restore` as JSON; the
//! envelope never enters the payload, so checksums stay payload-only.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::helper::unix_timestamp;
use crate::ids::AssetId;

/// Envelope metadata carried by every asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Unix timestamp (ms) when the asset was created
    pub created_at: i64,

    /// Unix timestamp (ms) of the last save or tag edit
    pub updated_at: i64,

    /// Monotonic version, starting at 1 on first save
    pub version: i64,

    /// Deduplicated, order-irrelevant labels used by the tag index
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Free-form key/value annotations, opaque to the registry
    #[serde(default)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl AssetMetadata {
    /// Create metadata for a brand-new asset
    pub fn new() -> Self {
        let now = unix_timestamp();
        Self {
            created_at: now,
            updated_at: now,
            version: 1,
            tags: BTreeSet::new(),
            custom: BTreeMap::new(),
        }
    }

    /// Add a tag; a duplicate is a no-op
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        if self.tags.insert(tag.into()) {
            self.touch();
        }
    }

    /// Remove a tag; returns whether it was present
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.tags.remove(tag);
        if removed {
            self.touch();
        }
        removed
    }

    /// Check whether a tag is present
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = unix_timestamp();
    }
}

impl Default for AssetMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable capture of an asset's prior state, retained after an update
#[derive(Debug, Clone)]
pub struct VersionSnapshot {
    pub asset_id: AssetId,
    pub version: i64,
    pub payload: serde_json::Value,
    pub metadata: AssetMetadata,
    pub checksum: String,
    /// Unix timestamp (ms) when the snapshot row was written
    pub created_at: i64,
}

/// Capability set every storable record implements.
///
/// All methods are pure over the record's own data: no filesystem, network,
/// or registry access is permitted inside them.
pub trait Asset: Send + Sync + std::fmt::Debug {
    /// Opaque unique identifier, immutable after creation
    fn id(&self) -> &AssetId;

    /// Type name under which this record's contract is registered
    fn asset_type(&self) -> &'static str;

    fn metadata(&self) -> &AssetMetadata;

    fn metadata_mut(&mut self) -> &mut AssetMetadata;

    /// Check structural and range invariants of the payload
    fn validate(&self) -> Result<()>;

    /// Export the type-specific payload as JSON (envelope excluded)
    fn export(&self) -> Result<serde_json::Value>;

    /// Reattach the stored identity and metadata after a payload import
    fn restore(&mut self, id: AssetId, metadata: AssetMetadata);

    /// Integrity digest over the type name and exported payload
    fn checksum(&self) -> Result<String> {
        crate::helper::asset_checksum(self.asset_type(), &self.export()?)
    }
}
