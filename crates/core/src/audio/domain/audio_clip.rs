use std::path::Path;

use crate::shared::constants::AUDIO_EXTENSIONS;

/// An uploaded audio payload, held in memory until it is staged for transcription.
#[derive(Clone, Debug)]
pub struct AudioClip {
    bytes: Vec<u8>,
    extension: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            bytes,
            extension: extension.into().trim_start_matches('.').to_lowercase(),
        }
    }

    /// Reads a clip from disk, keeping the file's extension as the container hint.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("mp3");
        Ok(Self::new(bytes, extension))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn has_supported_extension(&self) -> bool {
        AUDIO_EXTENSIONS.contains(&self.extension.as_str())
    }
}
