//! Generated-media reference records
//!
//! Audio, image, and video assets produced by the external TTS/image/video
//! backends. The registry stores references and descriptive fields only;
//! binary content stays wherever the generator wrote it. Validation checks
//! the fields, never the filesystem.

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetMetadata};
use crate::error::{RegistryError, Result};
use crate::ids::AssetId;

const AUDIO_FORMATS: &[&str] = &["wav", "mp3", "ogg", "flac", "m4a"];
const IMAGE_FORMATS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];
const VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

fn format_from_path(filepath: &str) -> String {
    filepath
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn check_media_fields(filepath: &str, format: &str, allowed: &[&str]) -> Result<()> {
    if filepath.is_empty() {
        return Err(RegistryError::validation("filepath", "must not be empty"));
    }
    if !allowed.contains(&format) {
        return Err(RegistryError::validation(
            "format",
            format!("unsupported format `{format}`, allowed: {allowed:?}"),
        ));
    }
    Ok(())
}

/// Audio asset (voice messages, music, sound effects)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub filepath: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    /// 1 = mono, 2 = stereo
    #[serde(default)]
    pub channels: Option<u16>,
    pub format: String,
}

impl AudioAsset {
    pub const KIND: &'static str = "audio";

    /// Create an audio asset, inferring the format from the file extension
    pub fn new(filepath: impl Into<String>) -> Self {
        let filepath = filepath.into();
        let format = format_from_path(&filepath);
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            filepath,
            duration: None,
            sample_rate: None,
            channels: None,
            format,
        }
    }
}

impl Asset for AudioAsset {
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
        check_media_fields(&self.filepath, &self.format, AUDIO_FORMATS)?;
        if let Some(duration) = self.duration {
            if duration < 0.0 {
                return Err(RegistryError::validation("duration", "must not be negative"));
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

/// Image asset (photos, avatars, backgrounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub filepath: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub format: String,
}

impl ImageAsset {
    pub const KIND: &'static str = "image";

    /// Create an image asset, inferring the format from the file extension
    pub fn new(filepath: impl Into<String>) -> Self {
        let filepath = filepath.into();
        let format = format_from_path(&filepath);
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            filepath,
            width: None,
            height: None,
            format,
        }
    }
}

impl Asset for ImageAsset {
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
        check_media_fields(&self.filepath, &self.format, IMAGE_FORMATS)
    }

    fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn restore(&mut self, id: AssetId, metadata: AssetMetadata) {
        self.id = id;
        self.metadata = metadata;
    }
}

/// Video asset (video messages, clips)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    #[serde(skip)]
    id: AssetId,
    #[serde(skip)]
    metadata: AssetMetadata,

    pub filepath: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    pub format: String,
    #[serde(default = "default_has_audio")]
    pub has_audio: bool,
}

fn default_has_audio() -> bool {
    true
}

impl VideoAsset {
    pub const KIND: &'static str = "video";

    /// Create a video asset, inferring the format from the file extension
    pub fn new(filepath: impl Into<String>) -> Self {
        let filepath = filepath.into();
        let format = format_from_path(&filepath);
        Self {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            filepath,
            duration: None,
            width: None,
            height: None,
            fps: None,
            format,
            has_audio: true,
        }
    }
}

impl Asset for VideoAsset {
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
        check_media_fields(&self.filepath, &self.format, VIDEO_FORMATS)?;
        if let Some(duration) = self.duration {
            if duration < 0.0 {
                return Err(RegistryError::validation("duration", "must not be negative"));
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
