//! Question generation over an [`LlmProvider`].
//!
//! [`QuestionGenerator::generate`] is the boundary where capability failures
//! stop: anything that goes wrong after the topic check becomes a sentinel
//! record carrying the failure description.

use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::error::{ProviderError, QuizError};
use crate::model::{Difficulty, QuestionRecord};
use crate::parser::parse_response;
use crate::prompt::question_prompt;
use crate::traits::{GenerateRequest, LlmProvider};

/// Settings shared by question, hint, and follow-up generation.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens per reply.
    pub max_tokens: u32,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Log every instruction at `info` instead of `trace`.
    pub echo_prompts: bool,
    /// Attempts the deduplicator makes before giving up.
    pub dedup_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-pro-latest".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            system_prompt: None,
            echo_prompts: false,
            dedup_attempts: 5,
        }
    }
}

/// Send `prompt` and return the trimmed reply, treating an empty reply as a
/// provider failure.
pub(crate) async fn complete(
    provider: &dyn LlmProvider,
    config: &GenerationConfig,
    prompt: String,
) -> anyhow::Result<String> {
    if config.echo_prompts {
        info!(provider = provider.name(), "prompt sent:\n{prompt}");
    } else {
        trace!(provider = provider.name(), "prompt sent:\n{prompt}");
    }

    let request = GenerateRequest {
        model: config.model.clone(),
        prompt,
        system_prompt: config.system_prompt.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let response = provider.generate(&request).await?;
    debug!(
        model = %response.model,
        latency_ms = response.latency_ms,
        "received {} bytes",
        response.content.len()
    );

    let content = response.content.trim();
    if content.is_empty() {
        return Err(ProviderError::EmptyResponse(provider.name().to_string()).into());
    }
    Ok(content.to_string())
}

/// Turns a topic and difficulty into a [`QuestionRecord`].
pub struct QuestionGenerator {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate one question.
    ///
    /// Returns `Err` only for an empty topic, before anything is sent. Every
    /// other failure yields [`QuestionRecord::generation_error`].
    pub async fn generate(
        &self,
        topic: &str,
        difficulty: Difficulty,
        recent: &[String],
    ) -> Result<QuestionRecord, QuizError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(QuizError::EmptyTopic);
        }

        let prompt = question_prompt(topic, difficulty, recent);
        match self.try_generate(prompt, difficulty).await {
            Ok(record) => Ok(record),
            Err(e) => {
                let permanent = e
                    .downcast_ref::<ProviderError>()
                    .is_some_and(ProviderError::is_permanent);
                if permanent {
                    error!(
                        provider = self.provider.name(),
                        "question generation failed, check the provider config: {e}"
                    );
                } else {
                    warn!(provider = self.provider.name(), "question generation failed: {e}");
                }
                Ok(QuestionRecord::generation_error(e.to_string(), difficulty))
            }
        }
    }

    async fn try_generate(
        &self,
        prompt: String,
        difficulty: Difficulty,
    ) -> anyhow::Result<QuestionRecord> {
        let content = complete(self.provider.as_ref(), &self.config, prompt).await?;
        Ok(parse_response(&content).into_record(difficulty)?)
    }
}
