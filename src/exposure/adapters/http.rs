//! OpenAI-compatible chat-completion adapter for exposure evaluation.

use crate::exposure::{
    domain::ExposureEvaluation,
    ports::{ExposureEvaluationError, ExposureEvaluationResult, ExposureEvaluator},
};
use async_trait::async_trait;
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default DashScope OpenAI-compatible chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// Default analysis model.
pub const DEFAULT_MODEL: &str = "qwen-plus";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_ERROR_BODY_CHARS: usize = 512;

const SYSTEM_PROMPT: &str = "You are a brand analysis assistant. Always respond in valid JSON.";

const ANALYSIS_TEMPLATE: &str = "\
Analyse the brand exposure in the text below. Respond with a JSON object \
containing exactly these fields:
brand_score: brand score (0-100)
exposure_count: number of times the brand is mentioned (integer)
exposure_rank: rank of the brand among all brands mentioned (integer, 1 is highest)
analysis: a short analysis report

Text:
{{ response_text }}";

/// Connection settings for [`HttpExposureEvaluator`].
#[derive(Clone)]
pub struct HttpExposureEvaluatorConfig {
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Bearer token. Evaluation fails with
    /// [`ExposureEvaluationError::MissingCredentials`] when unset.
    pub api_key: Option<String>,
    /// Model name sent in the request body.
    pub model: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for HttpExposureEvaluatorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for HttpExposureEvaluatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpExposureEvaluatorConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Exposure evaluator backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct HttpExposureEvaluator {
    client: reqwest::Client,
    config: HttpExposureEvaluatorConfig,
}

impl HttpExposureEvaluator {
    /// Builds an evaluator with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ExposureEvaluationError::Transport`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: HttpExposureEvaluatorConfig) -> ExposureEvaluationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ExposureEvaluationError::transport)?;
        Ok(Self { client, config })
    }

    /// Returns the evaluator configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpExposureEvaluatorConfig {
        &self.config
    }

    fn api_key(&self) -> ExposureEvaluationResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ExposureEvaluationError::MissingCredentials)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionEnvelope {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl ExposureEvaluator for HttpExposureEvaluator {
    async fn evaluate(&self, response_text: &str) -> ExposureEvaluationResult<ExposureEvaluation> {
        let api_key = self.api_key()?;
        let user_prompt = render_analysis_prompt(response_text)?;
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(ExposureEvaluationError::transport)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(ExposureEvaluationError::transport)?;

        if !status.is_success() {
            return Err(ExposureEvaluationError::UnexpectedStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        parse_evaluation_envelope(&text)
    }
}

/// Renders the user message sent to the analysis model.
pub(crate) fn render_analysis_prompt(response_text: &str) -> ExposureEvaluationResult<String> {
    let environment = Environment::new();
    environment
        .render_str(ANALYSIS_TEMPLATE, context! { response_text => response_text })
        .map_err(|error| ExposureEvaluationError::PromptRendering(error.to_string()))
}

/// Extracts the evaluation from a chat-completion response body.
pub(crate) fn parse_evaluation_envelope(body: &str) -> ExposureEvaluationResult<ExposureEvaluation> {
    let envelope: ChatCompletionEnvelope = serde_json::from_str(body)
        .map_err(|error| ExposureEvaluationError::MalformedEnvelope(error.to_string()))?;
    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or(ExposureEvaluationError::EmptyChoices)?;
    serde_json::from_str(&choice.message.content)
        .map_err(|error| ExposureEvaluationError::MalformedEvaluation(error.to_string()))
}
