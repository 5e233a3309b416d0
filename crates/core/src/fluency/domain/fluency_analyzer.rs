use super::fluency_report::FluencyReport;
use crate::audio::domain::transcript::{Transcript, WordTiming};

/// Silence between two words longer than this counts as a pause.
pub const PAUSE_THRESHOLD_SECS: f64 = 0.4;

/// Points deducted from the 0-100 baseline per detected pause.
pub const PAUSE_PENALTY: f64 = 2.5;

const BASELINE_SCORE: f64 = 100.0;

/// Deterministic fluency metrics from word-level timings.
pub struct FluencyAnalyzer;

impl FluencyAnalyzer {
    pub fn analyze(transcript: &Transcript) -> FluencyReport {
        Self::analyze_timings(transcript.duration(), transcript.words())
    }

    pub fn analyze_timings(duration: f64, words: &[WordTiming]) -> FluencyReport {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        let total_words = words.len();
        let pause_count = Self::count_pauses(words);

        FluencyReport {
            total_words,
            duration_seconds: duration,
            words_per_minute: round2(Self::words_per_minute(total_words, duration)),
            pause_count,
            fluency_score: round2(Self::fluency_score(pause_count)),
        }
    }

    pub fn words_per_minute(total_words: usize, duration: f64) -> f64 {
        if duration > 0.0 {
            total_words as f64 / (duration / 60.0)
        } else {
            0.0
        }
    }

    /// Counts gaps longer than [`PAUSE_THRESHOLD_SECS`], scanning in the given order.
    ///
    /// The scan starts from `t = 0`, so leading silence before the first
    /// word is a pause too. Overlapping or out-of-order words produce
    /// negative gaps and are never counted.
    pub fn count_pauses(words: &[WordTiming]) -> usize {
        let mut prev_end = 0.0;
        let mut pauses = 0;
        for word in words {
            if word.start - prev_end > PAUSE_THRESHOLD_SECS {
                pauses += 1;
            }
            prev_end = word.end;
        }
        pauses
    }

    /// Maps a pause count onto `[0, 10]`, reaching 0 at 40 pauses.
    pub fn fluency_score(pause_count: usize) -> f64 {
        let raw = BASELINE_SCORE - pause_count as f64 * PAUSE_PENALTY;
        raw.clamp(0.0, BASELINE_SCORE) / 10.0
    }
}

/// Two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
