use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::audio::domain::audio_clip::AudioClip;

/// An uploaded clip persisted to a temp file for the transcription call.
///
/// The file is deleted when this value drops.
#[derive(Debug)]
pub struct StagedAudio {
    file: NamedTempFile,
}

impl StagedAudio {
    pub fn stage(clip: &AudioClip) -> std::io::Result<Self> {
        let suffix = format!(".{}", clip.extension());
        let mut file = tempfile::Builder::new()
            .prefix("speechgrade-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(clip.bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
