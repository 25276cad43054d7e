//! Error types.
//!
//! `QuizError` covers input and session-state mistakes made by the caller.
//! `ProviderError` represents failures when talking to a text-generation
//! backend; it lives here so the generator can classify failures without
//! string matching.

use thiserror::Error;

/// Errors surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The topic was empty or whitespace only.
    #[error("topic is required to generate a quiz question")]
    EmptyTopic,

    /// `advance` was called after the last question was delivered.
    #[error("quiz is finished after {0} questions")]
    SessionFinished(u32),

    /// An answer was submitted before any question was delivered.
    #[error("no question has been delivered yet")]
    NoActiveQuestion,

    /// A final score message was requested for zero questions.
    #[error("cannot score a quiz with zero questions")]
    NoQuestionsScored,
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The provider answered but returned no text.
    #[error("{0} response did not return text")]
    EmptyResponse(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Map a non-success HTTP status to the matching error.
    pub fn from_status(status: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        match status {
            429 => ProviderError::RateLimited {
                retry_after_ms: retry_after_secs.unwrap_or(5) * 1000,
            },
            401 | 403 => ProviderError::AuthenticationFailed(body),
            404 => ProviderError::ModelNotFound(body),
            _ => ProviderError::ApiError {
                status,
                message: body,
            },
        }
    }
}
