//! Role definition records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::asset::{Asset, AssetMetadata};
use crate::error::{RegistryError, Result};
use crate::ids::AssetId;

fn default_role_type() -> String {
    "companion".to_string()
}

/// Role asset: what a character is allowed and expected to do within a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub name: String,
    #[serde(default)]
    pub description: String,
    /// companion, assistant, narrator, ...
    #[serde(default = "default_role_type")]
    pub role_type: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub permissions: BTreeMap<String, bool>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl RoleAsset {
    pub const KIND: &'static str = "role";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            name: name.into(),
            description: String::new(),
            role_type: default_role_type(),
            context: String::new(),
            goals: Vec::new(),
            constraints: Vec::new(),
            permissions: BTreeMap::new(),
            capabilities: Vec::new(),
        }
    }
}

impl Asset for RoleAsset {
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
            return Err(RegistryError::validation("name", "role must have a name"));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut role = RoleAsset::new("Evening companion");
        role.goals = vec!["keep the user company".to_string()];
        role.permissions.insert("send_media".to_string(), true);

        let payload = role.export().unwrap();
        let mut imported: RoleAsset = serde_json::from_value(payload).unwrap();
        imported.restore(role.id.clone(), role.metadata.clone());
        assert_eq!(imported, role);
    }
}
