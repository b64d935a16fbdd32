//! Dispatcher for the OpenAI Responses API: one request out, one
//! schema-constrained batch of phrases back.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{GenerateError, Result};
use crate::language::{LANGUAGE_INSTRUCTIONS, user_task};
use crate::schema::{SCHEMA_NAME, phrase_batch_schema};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const MAX_REPORTED_BODY: usize = 600;

/// Anything that can produce one phrase-batch document as raw text. The
/// entry point runs against this seam so tests can inject a fake.
#[async_trait]
pub trait PhraseGenerator {
    async fn generate(&self) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    text: TextConfig,
}

#[derive(Debug, Serialize)]
struct InputMessage {
    role: String,
    content: String,
}

impl InputMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TextConfig {
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct OutputFormat {
    #[serde(rename = "type")]
    format_type: String,
    name: String,
    schema: Value,
    strict: bool,
}

fn phrase_batch_request(model: &str) -> ResponsesRequest {
    ResponsesRequest {
        model: model.to_owned(),
        input: vec![
            InputMessage::system(LANGUAGE_INSTRUCTIONS),
            InputMessage::user(user_task()),
        ],
        text: TextConfig {
            format: OutputFormat {
                format_type: "json_schema".to_string(),
                name: SCHEMA_NAME.to_string(),
                schema: phrase_batch_schema(),
                strict: true,
            },
        },
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesEnvelope {
    status: String,
    #[serde(default)]
    output: Vec<OutputItem>,
    error: Option<ErrorDetail>,
    incomplete_details: Option<IncompleteDetails>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message { content: Vec<ContentPart> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    param: Option<String>,
}

impl ResponsesEnvelope {
    /// Concatenated `output_text` parts of every message item, the same
    /// text the service reports as the response's output text.
    fn into_batch_text(self) -> Result<String> {
        match self.status.as_str() {
            "completed" => {}
            "incomplete" => {
                let reason = self
                    .incomplete_details
                    .and_then(|details| details.reason)
                    .unwrap_or_else(|| "reason not reported".to_string());
                return Err(GenerateError::SchemaViolation(format!(
                    "generation stopped before a conforming batch was produced ({reason})"
                )));
            }
            "failed" => {
                let message = self
                    .error
                    .map(|error| error.message)
                    .unwrap_or_else(|| "no details reported".to_string());
                return Err(GenerateError::Service(format!(
                    "generation run failed: {message}"
                )));
            }
            other => {
                return Err(GenerateError::UnexpectedResponse(format!(
                    "response finished in state `{other}`"
                )));
            }
        }

        let mut batch = String::new();
        let mut refusal = None;

        for item in self.output {
            let OutputItem::Message { content } = item else {
                continue;
            };
            for part in content {
                match part {
                    ContentPart::OutputText { text } => batch.push_str(&text),
                    ContentPart::Refusal { refusal: message } => refusal = Some(message),
                    ContentPart::Other => {}
                }
            }
        }

        if !batch.is_empty() {
            return Ok(batch);
        }

        Err(match refusal {
            Some(message) => {
                GenerateError::UnexpectedResponse(format!("model refused the task: {message}"))
            }
            None => GenerateError::UnexpectedResponse("response carried no output text".to_string()),
        })
    }
}

fn classify_http_failure(status: StatusCode, body: &str) -> GenerateError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .ok();

    let message = match &detail {
        Some(detail) => detail.message.clone(),
        None if body.trim().is_empty() => "no details in response body".to_string(),
        None => truncate_to_char_boundary(body.trim(), MAX_REPORTED_BODY).to_string(),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerateError::Authentication(format!("HTTP {status}: {message}"))
        }
        StatusCode::BAD_REQUEST if mentions_schema(detail.as_ref(), &message) => {
            GenerateError::SchemaViolation(format!("HTTP {status}: {message}"))
        }
        _ => GenerateError::Service(format!("HTTP {status}: {message}")),
    }
}

fn mentions_schema(detail: Option<&ErrorDetail>, message: &str) -> bool {
    let param_mentions_it = detail
        .and_then(|detail| detail.param.as_deref())
        .is_some_and(|param| param.contains("schema") || param.contains("text.format"));

    param_mentions_it || message.to_ascii_lowercase().contains("schema")
}

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Client for the hosted generation endpoint. Constructed explicitly by the
/// entry point and handed down, never held in module state.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    /// Point the client at a different host (proxy, compatible server, or a
    /// test double).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PhraseGenerator for OpenAiClient {
    async fn generate(&self) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(GenerateError::Configuration(
                "OPENAI_API_KEY is empty; set it in the environment or a local .env file"
                    .to_string(),
            ));
        }

        let request = phrase_batch_request(&self.model);
        info!(model = %self.model, "Requesting phrase batch");
        let started = Instant::now();

        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|error| GenerateError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &body));
        }

        let envelope: ResponsesEnvelope = response.json().await.map_err(|error| {
            if error.is_decode() {
                GenerateError::UnexpectedResponse(format!("undecodable response body: {error}"))
            } else {
                GenerateError::Transport(error.to_string())
            }
        })?;

        if let Some(usage) = &envelope.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Token usage"
            );
        }
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            status = %envelope.status,
            "Phrase batch response received"
        );

        envelope.into_batch_text()
    }
}
