//! Message records: conversation history entries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::asset::{Asset, AssetMetadata};
use crate::error::{RegistryError, Result};
use crate::helper::unix_timestamp;
use crate::ids::AssetId;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Character,
}

fn default_message_type() -> String {
    "text".to_string()
}

/// Message asset: one entry of a conversation, optionally pointing at a
/// generated media asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub conversation_id: String,
    #[serde(default)]
    pub character_id: Option<AssetId>,
    pub sender: Sender,
    #[serde(default)]
    pub content: String,
    /// text, image, video, audio, ...
    #[serde(default = "default_message_type")]
    pub message_type: String,
    /// Reference to a media asset for non-text messages
    #[serde(default)]
    pub media_id: Option<AssetId>,
    /// Unix timestamp (ms) the message was sent
    pub timestamp: i64,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MessageAsset {
    pub const KIND: &'static str = "message";

    pub fn new(
        conversation_id: impl Into<String>,
        sender: Sender,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            conversation_id: conversation_id.into(),
            character_id: None,
            sender,
            content: content.into(),
            message_type: default_message_type(),
            media_id: None,
            timestamp: unix_timestamp(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_media(mut self, media_id: AssetId, message_type: impl Into<String>) -> Self {
        self.media_id = Some(media_id);
        self.message_type = message_type.into();
        self
    }
}

impl Asset for MessageAsset {
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
        if self.conversation_id.is_empty() {
            return Err(RegistryError::validation(
                "conversation_id",
                "message must belong to a conversation",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_conversation() {
        let message = MessageAsset::new("", Sender::User, "hi");
        assert!(matches!(
            message.validate().unwrap_err(),
            RegistryError::Validation { field, .. } if field == "conversation_id"
        ));
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let message = MessageAsset::new("conv-1", Sender::Character, "hello");
        let payload = message.export().unwrap();
        assert_eq!(payload["sender"], "character");
    }

    #[test]
    fn test_round_trip_with_media() {
        let media = AssetId::new();
        let message =
            MessageAsset::new("conv-1", Sender::Character, "").with_media(media.clone(), "image");

        let payload = message.export().unwrap();
        let mut imported: MessageAsset = serde_json::from_value(payload).unwrap();
        imported.restore(message.id.clone(), message.metadata.clone());
        assert_eq!(imported, message);
        assert_eq!(imported.media_id, Some(media));
    }
}
