/// One recognized word with its position in the clip, in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct WordTiming {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl WordTiming {
    /// Builds a word timing, normalizing inverted bounds so `start <= end`.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Output of the transcription collaborator for one analysis run.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcript {
    text: String,
    duration: f64,
    words: Vec<WordTiming>,
}

impl Transcript {
    /// A non-finite or negative duration is stored as 0.
    pub fn new(text: impl Into<String>, duration: f64, words: Vec<WordTiming>) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        Self {
            text: text.into(),
            duration,
            words,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn words(&self) -> &[WordTiming] {
        &self.words
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
