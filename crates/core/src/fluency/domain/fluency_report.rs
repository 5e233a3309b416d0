use serde::Serialize;

/// Timing-derived fluency metrics for one transcript.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FluencyReport {
    pub total_words: usize,
    pub duration_seconds: f64,
    pub words_per_minute: f64,
    pub pause_count: usize,
    pub fluency_score: f64,
}

impl FluencyReport {
    /// No timed words means the metrics say nothing about the speaker.
    pub fn is_low_confidence(&self) -> bool {
        self.total_words == 0
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Words", self.total_words.to_string()),
            (
                "Speech Duration (seconds)",
                format!("{}", self.duration_seconds),
            ),
            ("Words Per Minute (WPM)", format!("{:.2}", self.words_per_minute)),
            ("Pauses Detected", self.pause_count.to_string()),
            ("Fluency Score (0-10)", format!("{:.2}", self.fluency_score)),
        ]
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total_words": self.total_words,
            "duration_seconds": self.duration_seconds,
            "words_per_minute": self.words_per_minute,
            "pause_count": self.pause_count,
            "fluency_score": self.fluency_score,
        })
    }
}
