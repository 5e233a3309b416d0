use std::fs;
use std::path::Path;

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;

use crate::audio::domain::speech_transcriber::{SpeechTranscriber, TranscriptionError};
use crate::audio::domain::transcript::{Transcript, WordTiming};
use crate::shared::credential::ApiCredential;
use crate::shared::settings::ServiceSettings;

/// Speech recognizer backed by an OpenAI-compatible `/audio/transcriptions` endpoint.
///
/// Requests `verbose_json` with word-level timestamp granularity.
#[derive(Debug)]
pub struct WhisperApiTranscriber {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    words: Option<Vec<ApiWord>>,
}

#[derive(Debug, Deserialize)]
struct ApiWord {
    word: String,
    start: f64,
    end: f64,
}

impl WhisperApiTranscriber {
    pub fn new(settings: &ServiceSettings) -> Result<Self, TranscriptionError> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(TranscriptionError::Http)?;
        Ok(Self {
            client,
            endpoint: settings.endpoint("audio/transcriptions"),
            model: settings.transcription_model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SpeechTranscriber for WhisperApiTranscriber {
    fn transcribe(
        &self,
        audio_path: &Path,
        credential: &ApiCredential,
    ) -> Result<Transcript, TranscriptionError> {
        let bytes = fs::read(audio_path).map_err(|e| TranscriptionError::Read {
            path: audio_path.display().to_string(),
            source: e,
        })?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        log::debug!("POST {} (model {})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .multipart(form)
            .send()
            .map_err(TranscriptionError::Http)?;

        let status = response.status();
        let body = response.text().map_err(TranscriptionError::Http)?;
        if !status.is_success() {
            return Err(TranscriptionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_transcription(&body)
    }
}

fn parse_transcription(body: &str) -> Result<Transcript, TranscriptionError> {
    let parsed: VerboseTranscription =
        serde_json::from_str(body).map_err(TranscriptionError::Decode)?;

    let words = parsed
        .words
        .unwrap_or_default()
        .into_iter()
        .map(|w| WordTiming::new(w.word.trim(), w.start, w.end))
        .collect();

    Ok(Transcript::new(
        parsed.text,
        parsed.duration.unwrap_or(0.0),
        words,
    ))
}
