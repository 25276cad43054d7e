//! Mock provider for tests and dry runs.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use quiztutor_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo};

use crate::error::ProviderError;

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Fail with a network error carrying this message.
    Fail(String),
}

/// Replies for prompts containing `needle`, cycled in order.
struct MockRule {
    needle: String,
    replies: Vec<MockReply>,
    cursor: AtomicUsize,
}

/// A mock LLM provider that replays scripted replies.
///
/// Rules are checked in insertion order; the first rule whose needle occurs
/// in the prompt answers. Each rule (and the default) cycles through its
/// replies, so a short script can drive an arbitrarily long quiz.
pub struct MockProvider {
    rules: Vec<MockRule>,
    default: MockRule,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::with_replies(vec![MockReply::Text(String::new())])
    }
}

impl MockProvider {
    /// A mock with no rules that answers every prompt with an empty string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::with_replies(vec![MockReply::Text(response.to_string())])
    }

    /// Create a mock that cycles through `responses` for every prompt.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_replies(responses.into_iter().map(MockReply::Text).collect())
    }

    /// Create a mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::with_replies(vec![MockReply::Fail(message.to_string())])
    }

    fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            rules: Vec::new(),
            default: MockRule {
                needle: String::new(),
                replies,
                cursor: AtomicUsize::new(0),
            },
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Answer prompts containing `needle` with `reply`.
    pub fn on(self, needle: &str, reply: &str) -> Self {
        self.on_sequence(needle, vec![MockReply::Text(reply.to_string())])
    }

    /// Answer prompts containing `needle` with `replies`, cycling.
    pub fn on_sequence(mut self, needle: &str, replies: Vec<MockReply>) -> Self {
        self.rules.push(MockRule {
            needle: needle.to_string(),
            replies,
            cursor: AtomicUsize::new(0),
        });
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_reply(&self, prompt: &str) -> MockReply {
        let rule = self
            .rules
            .iter()
            .find(|r| prompt.contains(r.needle.as_str()))
            .unwrap_or(&self.default);

        if rule.replies.is_empty() {
            return MockReply::Text(String::new());
        }
        let i = rule.cursor.fetch_add(1, Ordering::Relaxed) % rule.replies.len();
        rule.replies[i].clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());

        match self.next_reply(&request.prompt) {
            MockReply::Text(content) => Ok(GenerateResponse {
                content,
                model: request.model.clone(),
                latency_ms: 1,
            }),
            MockReply::Fail(message) => Err(ProviderError::NetworkError(message).into()),
        }
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}
