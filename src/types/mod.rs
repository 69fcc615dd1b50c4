//! Builtin asset types for the companion platform
//!
//! Characters, personalities, roles, scenes, messages, and generated-media
//! references. Each is an ordinary serde struct implementing the record
//! contract; consumers with their own record kinds register them the same
//! way through [`crate::contract::TypeRegistry`].

mod character;
mod media;
mod message;
mod personality;
mod role;
mod scene;

pub use character::{CharacterAsset, MessagingFrequency};
pub use media::{AudioAsset, ImageAsset, VideoAsset};
pub use message::{MessageAsset, Sender};
pub use personality::PersonalityAsset;
pub use role::RoleAsset;
pub use scene::SceneAsset;

use std::sync::Arc;

use crate::contract::PayloadContract;
use crate::error::Result;
use crate::registry::AssetRegistry;

/// Register every builtin asset type on a registry
pub fn register_builtins(registry: &AssetRegistry) -> Result<()> {
    registry.register_type(
        CharacterAsset::KIND,
        Arc::new(PayloadContract::<CharacterAsset>::new()),
        false,
    )?;
    registry.register_type(
        PersonalityAsset::KIND,
        Arc::new(PayloadContract::<PersonalityAsset>::new()),
        false,
    )?;
    registry.register_type(
        RoleAsset::KIND,
        Arc::new(PayloadContract::<RoleAsset>::new()),
        false,
    )?;
    registry.register_type(
        SceneAsset::KIND,
        Arc::new(PayloadContract::<SceneAsset>::new()),
        false,
    )?;
    registry.register_type(
        MessageAsset::KIND,
        Arc::new(PayloadContract::<MessageAsset>::new()),
        false,
    )?;
    registry.register_type(
        AudioAsset::KIND,
        Arc::new(PayloadContract::<AudioAsset>::new()),
        false,
    )?;
    registry.register_type(
        ImageAsset::KIND,
        Arc::new(PayloadContract::<ImageAsset>::new()),
        false,
    )?;
    registry.register_type(
        VideoAsset::KIND,
        Arc::new(PayloadContract::<VideoAsset>::new()),
        false,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtins() {
        let registry = AssetRegistry::in_memory().unwrap();
        register_builtins(&registry).unwrap();

        assert_eq!(
            registry.types().names(),
            vec![
                "audio",
                "character",
                "image",
                "message",
                "personality",
                "role",
                "scene",
                "video"
            ]
        );
    }

    #[test]
    fn test_register_builtins_twice_fails() {
        let registry = AssetRegistry::in_memory().unwrap();
        register_builtins(&registry).unwrap();
        assert!(register_builtins(&registry).is_err());
    }
}
