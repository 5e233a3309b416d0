use thiserror::Error;

use crate::audio::domain::transcript::Transcript;
use crate::fluency::domain::fluency_report::FluencyReport;
use crate::rubric::domain::request_schema::RequestSchema;
use crate::shared::constants::SCORING_FUNCTION_NAME;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScoringRequestError {
    #[error("request schema declares no required fields")]
    NoRequiredFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Everything the scoring backend needs for one call, independent of wire format.
///
/// The backend must answer by calling `function_name` with arguments
/// matching `schema`; a free-form reply is a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRequest {
    pub messages: Vec<ChatMessage>,
    pub function_name: String,
    pub function_description: String,
    pub schema: RequestSchema,
}

/// Composes the system/user prompt pair around a transcript and its metrics.
pub struct ScoringRequestBuilder<'a> {
    transcript: &'a Transcript,
    fluency: &'a FluencyReport,
    topic: &'a str,
    function_name: String,
}

impl<'a> ScoringRequestBuilder<'a> {
    pub fn new(transcript: &'a Transcript, fluency: &'a FluencyReport, topic: &'a str) -> Self {
        Self {
            transcript,
            fluency,
            topic,
            function_name: SCORING_FUNCTION_NAME.to_string(),
        }
    }

    pub fn function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    pub fn build(self, schema: RequestSchema) -> Result<ScoringRequest, ScoringRequestError> {
        if schema.required_keys().is_empty() {
            return Err(ScoringRequestError::NoRequiredFields);
        }

        let messages = vec![
            ChatMessage {
                role: Role::System,
                content: self.system_prompt(),
            },
            ChatMessage {
                role: Role::User,
                content: self.user_prompt(),
            },
        ];

        Ok(ScoringRequest {
            messages,
            function_name: self.function_name,
            function_description: "Record one score per criterion and the reasoning behind them."
                .to_string(),
            schema,
        })
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are an AI language model that evaluates speech transcriptions against \
             multiple criteria. Consider the following as the topic or question when judging \
             relevance: {topic}\n\n\
             Score every criterion between 0 and 10. Give 0 when the result is very poor \
             and 10 when it is excellent.",
            topic = self.topic.trim()
        )
    }

    fn user_prompt(&self) -> String {
        format!(
            "Analyze the following transcript strictly and report the result through the \
             structured output.\n\n\
             Transcript:\n\n{text}\n\n\
             Speech timing metrics: {metrics}\n\n\
             If filler words, stammering or pause phrases such as `um` are detected, reduce \
             the fluency score a little for each one. Base the fluency score on speech speed \
             and on the pause phrases found in the text.\n\n\
             Judge relevance to the topic strictly. If no relevance is found, give a low \
             score between 0 and 3.",
            text = self.transcript.text().trim(),
            metrics = self.fluency.to_json()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::transcript::WordTiming;
    use crate::fluency::domain::fluency_analyzer::FluencyAnalyzer;
    use crate::rubric::domain::criterion::Criterion;
    use crate::rubric::domain::request_schema::{FieldKind, RequestSchemaBuilder};
    use crate::rubric::domain::schema_compiler::SchemaCompiler;

    fn transcript() -> Transcript {
        Transcript::new(
            "um well I think",
            10.0,
            vec![
                WordTiming::new("um", 0.0, 0.3),
                WordTiming::new("well", 1.0, 1.3),
            ],
        )
    }

    fn build(topic: &str) -> ScoringRequest {
        let transcript = transcript();
        let report = FluencyAnalyzer::analyze(&transcript);
        let schema = SchemaCompiler::compile(&Criterion::defaults()).unwrap();
        ScoringRequestBuilder::new(&transcript, &report, topic)
            .build(schema)
            .unwrap()
    }

    #[test]
    fn test_builds_system_then_user_message() {
        let request = build("Describe your hometown");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
    }

    #[test]
    fn test_system_prompt_embeds_topic_and_scale() {
        let request = build("Describe your hometown");
        let system = &request.messages[0].content;
        assert!(system.contains("Describe your hometown"));
        assert!(system.contains("between 0 and 10"));
    }

    #[test]
    fn test_user_prompt_embeds_transcript_and_metrics() {
        let request = build("topic");
        let user = &request.messages[1].content;
        assert!(user.contains("um well I think"));
        assert!(user.contains("\"pause_count\":"));
        assert!(user.contains("between 0 and 3"));
    }

    #[test]
    fn test_attaches_schema_and_default_function() {
        let request = build("topic");
        assert_eq!(request.function_name, "score_asr");
        assert_eq!(request.schema.required_keys().len(), 5);
    }

    #[test]
    fn test_custom_function_name() {
        let transcript = transcript();
        let report = FluencyAnalyzer::analyze(&transcript);
        let schema = SchemaCompiler::compile(&Criterion::defaults()).unwrap();
        let request = ScoringRequestBuilder::new(&transcript, &report, "t")
            .function_name("grade")
            .build(schema)
            .unwrap();
        assert_eq!(request.function_name, "grade");
    }

    #[test]
    fn test_rejects_schema_without_required_fields() {
        let transcript = transcript();
        let report = FluencyAnalyzer::analyze(&transcript);

        let empty = RequestSchemaBuilder::new().build();
        assert_eq!(
            ScoringRequestBuilder::new(&transcript, &report, "t").build(empty),
            Err(ScoringRequestError::NoRequiredFields)
        );

        let mut optional_only = RequestSchemaBuilder::new();
        optional_only
            .optional("notes", FieldKind::String, "")
            .unwrap();
        assert_eq!(
            ScoringRequestBuilder::new(&transcript, &report, "t").build(optional_only.build()),
            Err(ScoringRequestError::NoRequiredFields)
        );
    }
}
