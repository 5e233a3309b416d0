use std::collections::HashMap;
use std::time::Instant;

use super::analysis_state::AnalysisState;

/// Cross-cutting observer for analysis runs.
///
/// Keeps the orchestrator free of any particular output mechanism, so the
/// CLI, tests and any future front end can each watch a run their own way.
pub trait AnalysisLogger: Send {
    /// A run moved from one state to the next.
    fn transition(&mut self, from: AnalysisState, to: AnalysisState);

    /// How long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time measurement (word count, pause count, ...).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullAnalysisLogger;

impl AnalysisLogger for NullAnalysisLogger {
    fn transition(&mut self, _from: AnalysisState, _to: AnalysisState) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Forwards events to the `log` facade and keeps per-stage timings and
/// metrics for a summary at the end of the run.
pub struct LogAnalysisLogger {
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    last_state: Option<AnalysisState>,
}

impl LogAnalysisLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            last_state: None,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let outcome = self.last_state.map_or("unknown", AnalysisState::as_str);
        let mut lines = vec![format!(
            "Analysis summary ({outcome}, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let total_ms: f64 = self.timings[stage].iter().sum();
            lines.push(format!("  {stage:18}: {total_ms:8.0}ms"));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let last = values.last().copied().unwrap_or_default();
            lines.push(format!("  {name}: {last}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for LogAnalysisLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisLogger for LogAnalysisLogger {
    fn transition(&mut self, from: AnalysisState, to: AnalysisState) {
        if from == AnalysisState::Idle && to == AnalysisState::AudioReceived {
            // New run: drop records from earlier runs.
            self.timings.clear();
            self.metrics.clear();
            self.start_time = Instant::now();
        }
        self.last_state = Some(to);
        log::debug!("Analysis state: {from} -> {to}");
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
