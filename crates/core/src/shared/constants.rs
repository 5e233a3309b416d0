pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

pub const TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const SCORING_MODEL: &str = "gpt-4o-mini";

/// Near-zero so repeated runs over the same transcript score alike.
pub const SCORING_TEMPERATURE: f32 = 0.00125;
pub const SCORING_FUNCTION_NAME: &str = "score_asr";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

pub const APP_DIR_NAME: &str = "SpeechGrade";
