use serde_json::Value;
use thiserror::Error;

use super::scoring_request::ScoringRequest;
use super::scoring_result::ResponseValidationError;
use crate::shared::credential::ApiCredential;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("scoring request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("scoring service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("scoring service answered without calling '{0}'")]
    MissingFunctionCall(String),
    #[error("scoring arguments are not valid JSON: {0}")]
    MalformedArguments(#[source] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ResponseValidationError),
}

/// Domain interface for the language-model scoring collaborator.
///
/// Returns the raw structured arguments; validation against the request
/// schema happens in the caller.
pub trait SpeechScorer: Send {
    fn score(
        &self,
        request: &ScoringRequest,
        credential: &ApiCredential,
    ) -> Result<Value, ScoringError>;
}
