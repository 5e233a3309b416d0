pub mod staged_audio;
pub mod whisper_api_transcriber;
