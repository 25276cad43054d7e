//! The text-generation capability.
//!
//! Every backend (Gemini, OpenAI, Ollama, the mock) implements
//! [`LlmProvider`] in the `quiztutor-providers` crate. The core only ever
//! sees this trait, so a session can be driven by a scripted provider in
//! tests and by a live model in production without any global switch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for LLM backends that turn an instruction into free-form text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send one instruction and wait for the reply.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List models known to this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request sent to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-1.5-pro-latest").
    pub model: String,
    /// The instruction text.
    pub prompt: String,
    /// Optional system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

/// System prompt shared by the HTTP providers.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert tutor. Follow the requested output format exactly and keep explanations short and accurate.";
