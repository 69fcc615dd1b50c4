//! Scene definition records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::asset::{Asset, AssetMetadata};
use crate::error::{RegistryError, Result};
use crate::ids::AssetId;

fn default_scene_type() -> String {
    "phone".to_string()
}

/// Scene asset: a presentation surface (phone, dashboard, bedroom, ...)
/// together with the characters and named assets it pulls in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_scene_type")]
    pub scene_type: String,
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
    /// Characters appearing in the scene
    #[serde(default)]
    pub characters: Vec<AssetId>,
    /// slot name -> asset id (background image, ambient audio, ...)
    #[serde(default)]
    pub assets: BTreeMap<String, AssetId>,
    #[serde(default)]
    pub server_config: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub ui_config: BTreeMap<String, serde_json::Value>,
}

impl SceneAsset {
    pub const KIND: &'static str = "scene";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            name: name.into(),
            description: String::new(),
            scene_type: default_scene_type(),
            config: BTreeMap::new(),
            characters: Vec::new(),
            assets: BTreeMap::new(),
            server_config: BTreeMap::new(),
            ui_config: BTreeMap::new(),
        }
    }
}

impl Asset for SceneAsset {
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
            return Err(RegistryError::validation("name", "scene must have a name"));
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
