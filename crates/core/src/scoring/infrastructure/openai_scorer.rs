use reqwest::blocking::Client;
use serde_json::{json, Value};

use crate::scoring::domain::scoring_request::ScoringRequest;
use crate::scoring::domain::speech_scorer::{ScoringError, SpeechScorer};
use crate::shared::credential::ApiCredential;
use crate::shared::settings::ServiceSettings;

/// Scorer backed by an OpenAI-compatible `/chat/completions` endpoint.
///
/// The request forces a single strict function call, so the model can only
/// answer with arguments matching the compiled schema.
#[derive(Debug)]
pub struct OpenAiScorer {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OpenAiScorer {
    pub fn new(settings: &ServiceSettings) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(ScoringError::Http)?;
        Ok(Self {
            client,
            endpoint: settings.endpoint("chat/completions"),
            model: settings.scoring_model.clone(),
            temperature: settings.scoring_temperature,
        })
    }

    pub fn request_body(&self, request: &ScoringRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
            "tools": [{
                "type": "function",
                "function": {
                    "name": request.function_name,
                    "description": request.function_description,
                    "parameters": request.schema.to_json(),
                    "strict": true,
                }
            }],
            "tool_choice": {
                "type": "function",
                "function": {"name": request.function_name}
            },
        })
    }
}

impl SpeechScorer for OpenAiScorer {
    fn score(
        &self,
        request: &ScoringRequest,
        credential: &ApiCredential,
    ) -> Result<Value, ScoringError> {
        let body = self.request_body(request);

        log::debug!("POST {} (model {})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .map_err(ScoringError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ScoringError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().map_err(ScoringError::Http)?;
        extract_arguments(&payload, &request.function_name)
    }
}

/// Pulls the named function call's arguments out of a chat completion.
fn extract_arguments(payload: &Value, function_name: &str) -> Result<Value, ScoringError> {
    let arguments = payload
        .pointer("/choices/0/message/tool_calls")
        .and_then(Value::as_array)
        .and_then(|calls| {
            calls.iter().find(|call| {
                call.pointer("/function/name").and_then(Value::as_str) == Some(function_name)
            })
        })
        .and_then(|call| call.pointer("/function/arguments"))
        .and_then(Value::as_str)
        .ok_or_else(|| ScoringError::MissingFunctionCall(function_name.to_string()))?;

    serde_json::from_str(arguments).map_err(ScoringError::MalformedArguments)
}
