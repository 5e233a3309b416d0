use std::fmt;
use std::time::Instant;

use thiserror::Error;

use super::analysis_logger::AnalysisLogger;
use super::analysis_state::AnalysisState;
use crate::audio::domain::audio_clip::AudioClip;
use crate::audio::domain::speech_transcriber::{SpeechTranscriber, TranscriptionError};
use crate::audio::domain::transcript::Transcript;
use crate::audio::infrastructure::staged_audio::StagedAudio;
use crate::fluency::domain::fluency_analyzer::FluencyAnalyzer;
use crate::fluency::domain::fluency_report::FluencyReport;
use crate::rubric::domain::criterion_registry::CriterionRegistry;
use crate::rubric::domain::schema_compiler::{SchemaCompilationError, SchemaCompiler};
use crate::scoring::domain::scoring_request::{ScoringRequestBuilder, ScoringRequestError};
use crate::scoring::domain::scoring_result::ScoringResult;
use crate::scoring::domain::speech_scorer::{ScoringError, SpeechScorer};
use crate::shared::credential::ApiCredential;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("an API credential is required")]
    MissingCredential,
    #[error("no audio was provided")]
    MissingAudio,
    #[error("failed to stage audio for transcription: {0}")]
    Staging(#[source] std::io::Error),
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("rubric cannot be scored: {0}")]
    Schema(#[from] SchemaCompilationError),
    #[error("could not build scoring request: {0}")]
    Request(#[from] ScoringRequestError),
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

impl AnalysisError {
    /// The state the run was in when this error occurred.
    pub fn stage(&self) -> AnalysisState {
        match self {
            AnalysisError::MissingCredential | AnalysisError::MissingAudio => AnalysisState::Idle,
            AnalysisError::Staging(_) => AnalysisState::AudioReceived,
            AnalysisError::Transcription(_) => AnalysisState::Transcribing,
            AnalysisError::Schema(_) | AnalysisError::Request(_) => AnalysisState::BuildingRequest,
            AnalysisError::Scoring(_) => AnalysisState::Scoring,
        }
    }
}

/// Inputs supplied by the presentation layer for one run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub audio: Option<AudioClip>,
    pub topic: String,
    pub credential: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub transcript: Transcript,
    pub fluency: FluencyReport,
    pub scoring: ScoringResult,
    /// Rubric version the scores were requested against.
    pub rubric_version: u64,
}

/// A failed run. Carries the fluency report when the run got that far.
#[derive(Debug)]
pub struct AnalysisFailure {
    pub error: AnalysisError,
    pub fluency: Option<FluencyReport>,
}

impl fmt::Display for AnalysisFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for AnalysisFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Single-run pipeline: stage audio → transcribe → fluency → schema →
/// request → score → validate.
///
/// Runs take `&mut self`, so a second run cannot start while one is in
/// flight. The rubric is only borrowed for reading during a run.
pub struct AnalyzeSpeechUseCase {
    transcriber: Box<dyn SpeechTranscriber>,
    scorer: Box<dyn SpeechScorer>,
    logger: Box<dyn AnalysisLogger>,
    state: AnalysisState,
}

impl AnalyzeSpeechUseCase {
    pub fn new(
        transcriber: Box<dyn SpeechTranscriber>,
        scorer: Box<dyn SpeechScorer>,
        logger: Box<dyn AnalysisLogger>,
    ) -> Self {
        Self {
            transcriber,
            scorer,
            logger,
            state: AnalysisState::Idle,
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn run(
        &mut self,
        request: AnalysisRequest,
        rubric: &CriterionRegistry,
    ) -> Result<AnalysisReport, AnalysisFailure> {
        if self.state.is_terminal() {
            self.advance(AnalysisState::Idle);
        }

        let credential = ApiCredential::new(request.credential).ok_or_else(|| {
            self.reject(AnalysisError::MissingCredential)
        })?;
        let clip = match request.audio {
            Some(clip) if !clip.is_empty() => clip,
            _ => return Err(self.reject(AnalysisError::MissingAudio)),
        };

        // 1. Stage the upload; the temp file lives until `staged` drops.
        self.advance(AnalysisState::AudioReceived);
        let staged = StagedAudio::stage(&clip)
            .map_err(|e| self.fail(AnalysisError::Staging(e), None))?;

        // 2. Transcribe
        self.advance(AnalysisState::Transcribing);
        let started = Instant::now();
        let transcript = self
            .transcriber
            .transcribe(staged.path(), &credential)
            .map_err(|e| self.fail(e.into(), None))?;
        drop(staged);
        self.logger.timing("transcribe", elapsed_ms(started));
        if !transcript.has_text() {
            return Err(self.fail(TranscriptionError::EmptyText.into(), None));
        }
        self.advance(AnalysisState::Transcribed);

        // 3. Fluency metrics
        self.advance(AnalysisState::ComputingFluency);
        let fluency = FluencyAnalyzer::analyze(&transcript);
        self.logger.metric("total_words", fluency.total_words as f64);
        self.logger.metric("pause_count", fluency.pause_count as f64);
        self.logger.metric("fluency_score", fluency.fluency_score);
        if fluency.is_low_confidence() {
            log::warn!("Transcript has no word timings; fluency metrics are low-confidence");
        }

        // 4. Schema and request from the rubric as it is right now
        self.advance(AnalysisState::BuildingRequest);
        let snapshot = rubric.snapshot();
        let schema = SchemaCompiler::compile(snapshot.criteria())
            .map_err(|e| self.fail(e.into(), Some(fluency.clone())))?;
        let scoring_request = ScoringRequestBuilder::new(&transcript, &fluency, &request.topic)
            .build(schema)
            .map_err(|e| self.fail(e.into(), Some(fluency.clone())))?;

        // 5. Score and validate against the schema that was sent
        self.advance(AnalysisState::Scoring);
        let started = Instant::now();
        let raw = self
            .scorer
            .score(&scoring_request, &credential)
            .map_err(|e| self.fail(e.into(), Some(fluency.clone())))?;
        self.logger.timing("score", elapsed_ms(started));
        let scoring = ScoringResult::from_response(&scoring_request.schema, &raw)
            .map_err(|e| self.fail(ScoringError::from(e).into(), Some(fluency.clone())))?;

        self.advance(AnalysisState::Done);
        self.logger.info(&format!(
            "Scored {} criteria (rubric v{})",
            scoring.scores.len(),
            snapshot.version()
        ));
        self.logger.summary();

        Ok(AnalysisReport {
            transcript,
            fluency,
            scoring,
            rubric_version: snapshot.version(),
        })
    }

    fn advance(&mut self, next: AnalysisState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        self.logger.transition(self.state, next);
        self.state = next;
    }

    /// Trigger preconditions failed; the run never left `Idle`.
    fn reject(&mut self, error: AnalysisError) -> AnalysisFailure {
        log::error!("Analysis not started: {error}");
        AnalysisFailure {
            error,
            fluency: None,
        }
    }

    fn fail(&mut self, error: AnalysisError, fluency: Option<FluencyReport>) -> AnalysisFailure {
        log::error!("Analysis failed during {}: {error}", self.state);
        self.advance(AnalysisState::Failed);
        self.logger.summary();
        AnalysisFailure { error, fluency }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::transcript::WordTiming;
    use crate::rubric::domain::request_schema::FieldKind;
    use crate::scoring::domain::scoring_request::ScoringRequest;
    use crate::scoring::domain::scoring_result::ResponseValidationError;
    use approx::assert_relative_eq;
    use serde_json::{json, Value};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    // ─── Stubs ───

    struct StubTranscriber {
        result: Result<Transcript, String>,
        seen_path: Arc<Mutex<Option<PathBuf>>>,
    }

    impl SpeechTranscriber for StubTranscriber {
        fn transcribe(
            &self,
            audio_path: &Path,
            _: &ApiCredential,
        ) -> Result<Transcript, TranscriptionError> {
            assert!(audio_path.exists(), "staged audio should exist during transcription");
            *self.seen_path.lock().unwrap() = Some(audio_path.to_path_buf());
            self.result.clone().map_err(|body| TranscriptionError::Api {
                status: 500,
                body,
            })
        }
    }

    /// Answers with every declared field: 7 for numbers, a sentence for strings.
    struct StubScorer {
        /// `Err(status)` makes the service itself fail.
        override_response: Option<Result<Value, u16>>,
        seen_request: Arc<Mutex<Option<ScoringRequest>>>,
    }

    impl SpeechScorer for StubScorer {
        fn score(
            &self,
            request: &ScoringRequest,
            _: &ApiCredential,
        ) -> Result<Value, ScoringError> {
            *self.seen_request.lock().unwrap() = Some(request.clone());
            match self.override_response {
                Some(Ok(ref response)) => return Ok(response.clone()),
                Some(Err(status)) => {
                    return Err(ScoringError::Api {
                        status,
                        body: "service unavailable".to_string(),
                    })
                }
                None => {}
            }
            let mut object = serde_json::Map::new();
            for field in request.schema.fields() {
                let value = match field.kind {
                    FieldKind::Number => json!(7.0),
                    FieldKind::String => json!("Consistent pace, a few fillers."),
                };
                object.insert(field.key.clone(), value);
            }
            Ok(Value::Object(object))
        }
    }

    struct RecordingLogger {
        transitions: Arc<Mutex<Vec<AnalysisState>>>,
    }

    impl AnalysisLogger for RecordingLogger {
        fn transition(&mut self, _from: AnalysisState, to: AnalysisState) {
            self.transitions.lock().unwrap().push(to);
        }
        fn timing(&mut self, _: &str, _: f64) {}
        fn metric(&mut self, _: &str, _: f64) {}
        fn info(&mut self, _: &str) {}
    }

    struct Harness {
        use_case: AnalyzeSpeechUseCase,
        seen_path: Arc<Mutex<Option<PathBuf>>>,
        seen_request: Arc<Mutex<Option<ScoringRequest>>>,
        transitions: Arc<Mutex<Vec<AnalysisState>>>,
    }

    fn harness(transcript: Result<Transcript, String>, response: Option<Value>) -> Harness {
        harness_with_reply(transcript, response.map(Ok))
    }

    fn harness_with_reply(
        transcript: Result<Transcript, String>,
        response: Option<Result<Value, u16>>,
    ) -> Harness {
        let seen_path = Arc::new(Mutex::new(None));
        let seen_request = Arc::new(Mutex::new(None));
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let use_case = AnalyzeSpeechUseCase::new(
            Box::new(StubTranscriber {
                result: transcript,
                seen_path: seen_path.clone(),
            }),
            Box::new(StubScorer {
                override_response: response,
                seen_request: seen_request.clone(),
            }),
            Box::new(RecordingLogger {
                transitions: transitions.clone(),
            }),
        );
        Harness {
            use_case,
            seen_path,
            seen_request,
            transitions,
        }
    }

    fn sample_transcript() -> Transcript {
        Transcript::new(
            "um well I think",
            10.0,
            vec![
                WordTiming::new("um", 0.0, 0.3),
                WordTiming::new("well", 1.0, 1.3),
                WordTiming::new("I", 1.35, 1.5),
                WordTiming::new("think", 1.55, 1.9),
            ],
        )
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            audio: Some(AudioClip::new(vec![1, 2, 3, 4], "mp3")),
            topic: "Describe your morning routine".to_string(),
            credential: "sk-test".to_string(),
        }
    }

    #[test]
    fn test_end_to_end_success() {
        let mut h = harness(Ok(sample_transcript()), None);
        let rubric = CriterionRegistry::with_defaults();

        let report = h.use_case.run(request(), &rubric).unwrap();

        assert_eq!(report.fluency.total_words, 4);
        assert_relative_eq!(report.fluency.words_per_minute, 24.0);
        assert_eq!(report.fluency.pause_count, 1);
        assert_relative_eq!(report.fluency.fluency_score, 9.75);
        assert_eq!(report.scoring.scores.len(), 4);
        assert_eq!(report.scoring.score("grammar"), Some(7.0));
        assert!(!report.scoring.reasoning.is_empty());
        assert_eq!(h.use_case.state(), AnalysisState::Done);
    }

    #[test]
    fn test_state_sequence_on_success() {
        let mut h = harness(Ok(sample_transcript()), None);
        h.use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .unwrap();

        assert_eq!(
            *h.transitions.lock().unwrap(),
            vec![
                AnalysisState::AudioReceived,
                AnalysisState::Transcribing,
                AnalysisState::Transcribed,
                AnalysisState::ComputingFluency,
                AnalysisState::BuildingRequest,
                AnalysisState::Scoring,
                AnalysisState::Done,
            ]
        );
    }

    #[test]
    fn test_staged_audio_removed_after_success() {
        let mut h = harness(Ok(sample_transcript()), None);
        h.use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .unwrap();
        let path = h.seen_path.lock().unwrap().clone().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_staged_audio_removed_after_transcription_failure() {
        let mut h = harness(Err("boom".to_string()), None);
        let failure = h
            .use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .unwrap_err();

        assert!(matches!(failure.error, AnalysisError::Transcription(_)));
        assert_eq!(failure.error.stage(), AnalysisState::Transcribing);
        assert!(failure.fluency.is_none());
        assert_eq!(h.use_case.state(), AnalysisState::Failed);
        let path = h.seen_path.lock().unwrap().clone().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_blank_credential_never_leaves_idle() {
        let mut h = harness(Ok(sample_transcript()), None);
        let mut req = request();
        req.credential = "  ".to_string();

        let failure = h
            .use_case
            .run(req, &CriterionRegistry::with_defaults())
            .unwrap_err();
        assert!(matches!(failure.error, AnalysisError::MissingCredential));
        assert_eq!(h.use_case.state(), AnalysisState::Idle);
        assert!(h.transitions.lock().unwrap().is_empty());
        assert!(h.seen_path.lock().unwrap().is_none());
    }

    #[test]
    fn test_missing_audio_is_rejected() {
        let mut h = harness(Ok(sample_transcript()), None);
        let mut req = request();
        req.audio = None;

        let failure = h
            .use_case
            .run(req, &CriterionRegistry::with_defaults())
            .unwrap_err();
        assert!(matches!(failure.error, AnalysisError::MissingAudio));
    }

    #[test]
    fn test_empty_transcript_text_is_transcription_failure() {
        let mut h = harness(Ok(Transcript::new("   ", 3.0, vec![])), None);
        let failure = h
            .use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .unwrap_err();
        assert!(matches!(
            failure.error,
            AnalysisError::Transcription(TranscriptionError::EmptyText)
        ));
        assert!(h.seen_request.lock().unwrap().is_none());
    }

    #[test]
    fn test_empty_rubric_fails_but_keeps_fluency() {
        let mut h = harness(Ok(sample_transcript()), None);
        let failure = h
            .use_case
            .run(request(), &CriterionRegistry::new())
            .unwrap_err();

        assert!(matches!(
            failure.error,
            AnalysisError::Schema(SchemaCompilationError::EmptyRubric)
        ));
        assert_eq!(failure.error.stage(), AnalysisState::BuildingRequest);
        assert_eq!(failure.fluency.unwrap().pause_count, 1);
        assert!(h.seen_request.lock().unwrap().is_none());
    }

    #[test]
    fn test_scoring_service_failure_keeps_fluency() {
        let mut h = harness_with_reply(Ok(sample_transcript()), Some(Err(503)));
        let failure = h
            .use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .unwrap_err();

        assert!(matches!(
            failure.error,
            AnalysisError::Scoring(ScoringError::Api { status: 503, .. })
        ));
        assert_eq!(failure.error.stage(), AnalysisState::Scoring);
        assert_eq!(h.use_case.state(), AnalysisState::Failed);
        let fluency = failure.fluency.unwrap();
        assert_eq!(fluency.total_words, 4);
        assert_relative_eq!(fluency.fluency_score, 9.75);
        assert!(h.seen_request.lock().unwrap().is_some());
    }

    #[test]
    fn test_incomplete_scoring_response_is_rejected() {
        let response = json!({"english_fluency": 8, "ReasoningForScores": "short"});
        let mut h = harness(Ok(sample_transcript()), Some(response));
        let failure = h
            .use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .unwrap_err();

        assert!(matches!(
            failure.error,
            AnalysisError::Scoring(ScoringError::Invalid(
                ResponseValidationError::MissingField(_)
            ))
        ));
        assert!(failure.fluency.is_some());
        assert_eq!(h.use_case.state(), AnalysisState::Failed);
    }

    #[test]
    fn test_schema_reflects_rubric_edits_between_runs() {
        let mut h = harness(Ok(sample_transcript()), None);
        let mut rubric = CriterionRegistry::with_defaults();
        h.use_case.run(request(), &rubric).unwrap();

        rubric.add("Clarity", "Is the answer easy to follow?").unwrap();
        rubric.remove(0).unwrap();
        let report = h.use_case.run(request(), &rubric).unwrap();

        let seen = h.seen_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            seen.schema.required_keys(),
            vec![
                "vocabulary",
                "grammar",
                "relevance_to_the_topic",
                "clarity",
                "ReasoningForScores"
            ]
        );
        assert_eq!(report.rubric_version, 2);
        assert_eq!(report.scoring.score("clarity"), Some(7.0));
    }

    #[test]
    fn test_new_run_allowed_after_failure() {
        let mut h = harness(Ok(sample_transcript()), None);
        assert!(h.use_case.run(request(), &CriterionRegistry::new()).is_err());
        assert_eq!(h.use_case.state(), AnalysisState::Failed);

        assert!(h
            .use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .is_ok());
        assert_eq!(h.use_case.state(), AnalysisState::Done);
    }

    #[test]
    fn test_topic_reaches_scoring_prompt() {
        let mut h = harness(Ok(sample_transcript()), None);
        h.use_case
            .run(request(), &CriterionRegistry::with_defaults())
            .unwrap();
        let seen = h.seen_request.lock().unwrap().clone().unwrap();
        assert!(seen.messages[0]
            .content
            .contains("Describe your morning routine"));
    }
}
