//! Scripted provider for unit tests inside this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo};

/// Replays queued replies in order, then repeats the last one.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        let next = self.replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(String::new())),
        };

        match reply {
            Ok(content) => Ok(GenerateResponse {
                content,
                model: request.model.clone(),
                latency_ms: 1,
            }),
            Err(message) => Err(ProviderError::NetworkError(message).into()),
        }
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        Vec::new()
    }
}

/// A well-formed reply for question `n`.
pub(crate) fn question_reply(n: usize) -> String {
    format!(
        "Question number {n}?\nA. first\nB. second\nC. third\nD. fourth\nAnswer: B\nExplanation: reason {n}"
    )
}
