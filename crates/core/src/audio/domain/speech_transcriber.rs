use std::path::Path;

use thiserror::Error;

use super::transcript::Transcript;
use crate::shared::credential::ApiCredential;

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("failed to read staged audio {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("transcription request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("transcription service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("could not decode transcription response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("transcription returned no text")]
    EmptyText,
}

/// Domain interface for the speech-to-text collaborator.
///
/// Implementations must return word-level timings alongside the text.
pub trait SpeechTranscriber: Send {
    fn transcribe(
        &self,
        audio_path: &Path,
        credential: &ApiCredential,
    ) -> Result<Transcript, TranscriptionError>;
}
