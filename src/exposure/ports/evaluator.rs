//! Evaluator port used by the result recorder.

use crate::exposure::domain::ExposureEvaluation;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for exposure evaluation.
pub type ExposureEvaluationResult<T> = Result<T, ExposureEvaluationError>;

/// Scores brand exposure in a model response.
#[async_trait]
pub trait ExposureEvaluator: Send + Sync {
    /// Evaluates `response_text` and returns the parsed score.
    ///
    /// # Errors
    ///
    /// Returns an [`ExposureEvaluationError`] describing which stage of the
    /// outbound call failed. Implementations must not retry.
    async fn evaluate(&self, response_text: &str) -> ExposureEvaluationResult<ExposureEvaluation>;
}

/// Errors returned by exposure evaluators.
#[derive(Debug, Clone, Error)]
pub enum ExposureEvaluationError {
    /// No API key was configured for the evaluation endpoint.
    #[error("no API key configured for the exposure evaluation endpoint")]
    MissingCredentials,

    /// The analysis prompt could not be rendered.
    #[error("failed to render analysis prompt: {0}")]
    PromptRendering(String),

    /// The request could not be sent or the response could not be read,
    /// including timeouts.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The endpoint answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body is not a chat-completion envelope.
    #[error("malformed response envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope contains no choices.
    #[error("response envelope contains no choices")]
    EmptyChoices,

    /// The model content is not the expected evaluation object.
    #[error("malformed evaluation content: {0}")]
    MalformedEvaluation(String),
}

impl ExposureEvaluationError {
    /// Wraps a transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
