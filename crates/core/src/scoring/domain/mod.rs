pub mod scoring_request;
pub mod scoring_result;
pub mod speech_scorer;
