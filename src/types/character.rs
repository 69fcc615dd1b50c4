//! Character records: the platform's central asset type
//!
//! A character carries its display identity, references to the personality
//! and role records that drive it, physical attributes used by the media
//! generators, and the behavior settings the autonomous scheduler reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::asset::{Asset, AssetMetadata};
use crate::error::{RegistryError, Result};
use crate::ids::AssetId;

/// How often a character initiates outbound messages on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagingFrequency {
    Low,
    #[default]
    Medium,
    High,
}

fn default_autonomy() -> f64 {
    0.5
}

/// Character asset with personality and role references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personality_id: Option<AssetId>,
    #[serde(default)]
    pub role_id: Option<AssetId>,
    /// Reference to an image asset
    #[serde(default)]
    pub avatar_id: Option<AssetId>,
    #[serde(default)]
    pub voice_profile: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// user id -> affinity
    #[serde(default)]
    pub relationships: BTreeMap<String, f64>,

    // Physical attributes
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub eye_color: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub build: Option<String>,

    // Behavior settings
    #[serde(default)]
    pub messaging_frequency: MessagingFrequency,
    #[serde(default = "default_autonomy")]
    pub autonomy_level: f64,
    #[serde(default)]
    pub nsfw_enabled: bool,
}

impl CharacterAsset {
    pub const KIND: &'static str = "character";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            name: name.into(),
            description: String::new(),
            personality_id: None,
            role_id: None,
            avatar_id: None,
            voice_profile: BTreeMap::new(),
            attributes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            age: None,
            gender: None,
            ethnicity: None,
            hair_color: None,
            eye_color: None,
            height: None,
            build: None,
            messaging_frequency: MessagingFrequency::default(),
            autonomy_level: default_autonomy(),
            nsfw_enabled: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_personality(mut self, personality_id: AssetId) -> Self {
        self.personality_id = Some(personality_id);
        self
    }

    pub fn with_role(mut self, role_id: AssetId) -> Self {
        self.role_id = Some(role_id);
        self
    }

    pub fn with_avatar(mut self, avatar_id: AssetId) -> Self {
        self.avatar_id = Some(avatar_id);
        self
    }
}

impl Asset for CharacterAsset {
    fn id(&self) -> &AssetId {
        &self.id
    }

    fn asset_type(&self) -> &'static str {
        Self::KIND
    }

    fn metadata(&self) -> &AssetMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut AssetMetadata {
        &mut self.metadata
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RegistryError::validation("name", "character must have a name"));
        }
        if !(0.0..=1.0).contains(&self.autonomy_level) {
            return Err(RegistryError::validation(
                "autonomy_level",
                "must be between 0.0 and 1.0",
            ));
        }
        Ok(())
    }

    fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn restore(&mut self, id: AssetId, metadata: AssetMetadata) {
        self.id = id;
        self.metadata = metadata;
    }
}
