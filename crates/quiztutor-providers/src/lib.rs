//! quiztutor-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Gemini, OpenAI-compatible APIs,
//! Ollama, and a scripted mock, plus the TOML configuration that selects
//! between them.

pub mod config;
pub mod error;
mod http;
pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{
    create_provider, load_config, load_config_from, parse_config, ProviderConfig, QuizTutorConfig,
};
pub use error::ProviderError;
