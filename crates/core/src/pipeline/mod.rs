pub mod analysis_logger;
pub mod analysis_state;
pub mod analyze_speech_use_case;
