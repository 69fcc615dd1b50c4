//! Personality configuration records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::asset::{Asset, AssetMetadata};
use crate::error::{RegistryError, Result};
use crate::ids::AssetId;

fn default_warmth() -> f64 {
    0.7
}

fn default_formality() -> f64 {
    0.3
}

fn default_humor() -> f64 {
    0.5
}

fn default_flirtiness() -> f64 {
    0.5
}

fn default_intelligence() -> f64 {
    0.7
}

fn default_creativity() -> f64 {
    0.6
}

fn default_personality_type() -> String {
    "friendly".to_string()
}

/// Personality asset: the tunable parameters and prompt material behind a
/// character's conversational behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_personality_type")]
    pub personality_type: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub speaking_style: BTreeMap<String, serde_json::Value>,
    /// (speaker, line) pairs shown to the language model as examples
    #[serde(default)]
    pub example_dialogues: Vec<BTreeMap<String, String>>,

    // Tunable parameters, each in [0.0, 1.0]
    #[serde(default = "default_warmth")]
    pub warmth: f64,
    #[serde(default = "default_formality")]
    pub formality: f64,
    #[serde(default = "default_humor")]
    pub humor: f64,
    #[serde(default = "default_flirtiness")]
    pub flirtiness: f64,
    #[serde(default = "default_intelligence")]
    pub intelligence: f64,
    #[serde(default = "default_creativity")]
    pub creativity: f64,
}

impl PersonalityAsset {
    pub const KIND: &'static str = "personality";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            name: name.into(),
            description: String::new(),
            personality_type: default_personality_type(),
            system_prompt: String::new(),
            traits: Vec::new(),
            speaking_style: BTreeMap::new(),
            example_dialogues: Vec::new(),
            warmth: default_warmth(),
            formality: default_formality(),
            humor: default_humor(),
            flirtiness: default_flirtiness(),
            intelligence: default_intelligence(),
            creativity: default_creativity(),
        }
    }

    fn parameters(&self) -> [(&'static str, f64); 6] {
        [
            ("warmth", self.warmth),
            ("formality", self.formality),
            ("humor", self.humor),
            ("flirtiness", self.flirtiness),
            ("intelligence", self.intelligence),
            ("creativity", self.creativity),
        ]
    }
}

impl Asset for PersonalityAsset {
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
            return Err(RegistryError::validation(
                "name",
                "personality must have a name",
            ));
        }
        for (field, value) in self.parameters() {
            if !(0.0..=1.0).contains(&value) {
                return Err(RegistryError::validation(
                    field,
                    "must be between 0.0 and 1.0",
                ));
            }
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
