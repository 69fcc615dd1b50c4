//! Error taxonomy for the asset registry
//!
//! Every failure a caller can act on is a distinct variant: validation
//! problems are corrected and retried, missing types are a configuration
//! error, blocked deletes carry the dependent ids so the caller can decide
//! whether to cascade, and checksum mismatches signal storage corruption
//! that must be surfaced, never repaired silently.

use thiserror::Error;

use crate::ids::AssetId;

/// Errors returned by registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A record failed its type's structural or range checks
    #[error("validation failed for field `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// No contract registered under this type name
    #[error("asset type not registered: {0}")]
    TypeNotRegistered(String),

    /// A contract is already registered under this type name
    #[error("asset type already registered: {0}")]
    TypeAlreadyRegistered(String),

    /// Unknown id, or unknown version of a known id
    #[error("asset not found: {id}{}", .version.map(|v| format!(" (version {v})")).unwrap_or_default())]
    AssetNotFound { id: AssetId, version: Option<i64> },

    /// Non-cascading delete blocked by existing dependents
    #[error("asset {id} has {} dependent asset(s); delete with cascade or unlink them first", .dependents.len())]
    DependencyConflict {
        id: AssetId,
        dependents: Vec<AssetId>,
    },

    /// Stored checksum does not match the recomputed one
    #[error("checksum mismatch for asset {id}: stored {stored}, computed {computed}")]
    Integrity {
        id: AssetId,
        stored: String,
        computed: String,
    },

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
