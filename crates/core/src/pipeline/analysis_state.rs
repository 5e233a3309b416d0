use std::fmt;

/// Where a single analysis run currently is.
///
/// `Failed` is terminal and reachable from every state except `Idle`;
/// a rejected trigger (no audio, no credential) never leaves `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisState {
    Idle,
    AudioReceived,
    Transcribing,
    Transcribed,
    ComputingFluency,
    BuildingRequest,
    Scoring,
    Done,
    Failed,
}

impl AnalysisState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisState::Done | AnalysisState::Failed)
    }

    pub fn can_transition_to(self, next: AnalysisState) -> bool {
        use AnalysisState::*;
        match (self, next) {
            (Idle, AudioReceived)
            | (AudioReceived, Transcribing)
            | (Transcribing, Transcribed)
            | (Transcribed, ComputingFluency)
            | (ComputingFluency, BuildingRequest)
            | (BuildingRequest, Scoring)
            | (Scoring, Done) => true,
            (Idle | Done | Failed, Failed) => false,
            (_, Failed) => true,
            // A finished run may be followed by a fresh one.
            (Done | Failed, Idle) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::AudioReceived => "audio-received",
            AnalysisState::Transcribing => "transcribing",
            AnalysisState::Transcribed => "transcribed",
            AnalysisState::ComputingFluency => "computing-fluency",
            AnalysisState::BuildingRequest => "building-request",
            AnalysisState::Scoring => "scoring",
            AnalysisState::Done => "done",
            AnalysisState::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
