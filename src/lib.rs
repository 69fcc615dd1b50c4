//! Versioned asset registry for the cosy companion platform
//!
//! This crate provides:
//! - **Records**: the [`Asset`] trait plus builtin character, personality,
//!   role, scene, message, and media types under [`types`]
//! - **Type registry**: runtime registration of record contracts via
//!   [`TypeRegistry`], open to new kinds
//! - **Storage**: [`AssetRegistry`], a SQLite-backed store with per-save
//!   version history, checksum verification on load, a tag index with
//!   AND-semantics search, and a dependency graph with cascade delete
//!
//! # Example
//!
//! ```ignore
//! use cosy_core::{AssetRegistry, CharacterAsset};
//!
//! let registry = AssetRegistry::open("registry.db")?;
//! cosy_core::types::register_builtins(&registry)?;
//!
//! let mut emma = CharacterAsset::new("Emma");
//! let id = registry.save(&mut emma)?;
//! let loaded = registry.load(CharacterAsset::KIND, &id, None)?;
//! ```

pub mod asset;
pub mod contract;
pub mod error;
mod helper;
pub mod ids;
pub mod registry;
pub mod types;

pub use asset::{Asset, AssetMetadata, VersionSnapshot};
pub use contract::{AssetContract, PayloadContract, TypeRegistry};
pub use error::{RegistryError, Result};
pub use ids::AssetId;
pub use registry::{AssetRegistry, RegistryStats, SearchHit};
pub use types::{
    AudioAsset, CharacterAsset, ImageAsset, MessageAsset, PersonalityAsset, RoleAsset, SceneAsset,
    Sender, VideoAsset,
};

#[cfg(test)]
mod tests {
    use super::*;

    // The flow a generative adapter follows: register the produced media,
    // link it to its character, and let cascade delete clean both up.
    #[test]
    fn test_media_adapter_flow() {
        let registry = AssetRegistry::in_memory().unwrap();
        types::register_builtins(&registry).unwrap();

        let mut emma = CharacterAsset::new("Emma");
        let character_id = registry.save(&mut emma).unwrap();

        let mut selfie = ImageAsset::new("generated/emma_selfie.png");
        selfie.metadata_mut().add_tag("selfie");
        let image_id = registry.save(&mut selfie).unwrap();
        registry
            .add_dependency(&image_id, &character_id, "references")
            .unwrap();

        let orphans = registry.find_orphans(None).unwrap();
        assert!(orphans.contains(&image_id));
        assert!(!orphans.contains(&character_id));

        let stats = registry.stats().unwrap();
        assert_eq!(stats.total_assets, 2);
        assert_eq!(stats.by_type["character"], 1);
        assert_eq!(stats.by_type["image"], 1);
        assert_eq!(stats.total_dependencies, 1);

        registry.delete(&character_id, true).unwrap();
        assert!(!registry.exists(&image_id).unwrap());
        assert_eq!(registry.stats().unwrap().total_assets, 0);
    }

    // A scheduler-style reader: load a character and inspect its behavior
    // settings without mutating anything.
    #[test]
    fn test_scheduler_read_path() {
        let registry = AssetRegistry::in_memory().unwrap();
        types::register_builtins(&registry).unwrap();

        let mut emma = CharacterAsset::new("Emma");
        emma.messaging_frequency = types::MessagingFrequency::High;
        emma.autonomy_level = 0.9;
        let id = registry.save(&mut emma).unwrap();

        let loaded = registry.load(CharacterAsset::KIND, &id, None).unwrap();
        let payload = loaded.export().unwrap();
        assert_eq!(payload["messaging_frequency"], "high");
        assert_eq!(payload["autonomy_level"], 0.9);
        assert_eq!(registry.stats().unwrap().total_versions, 0);
    }
}
