//! Ollama (local LLM) provider implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quiztutor_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, DEFAULT_SYSTEM_PROMPT,
};

use crate::error::ProviderError;
use crate::http;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower

/// Ollama local LLM provider.
pub struct OllamaProvider {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            base_url: base.to_string(),
            timeout_secs,
            client: http::build_client(timeout_secs)?,
        })
    }

    fn unreachable(&self) -> ProviderError {
        ProviderError::NetworkError(format!(
            "Ollama not reachable at {}. Is it running? Start with: ollama serve",
            self.base_url
        ))
    }

    /// Fetch the models pulled into the local Ollama instance.
    pub async fn list_models_async(&self) -> anyhow::Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|_| self.unreachable())?;

        let tags: OllamaTagsResponse = http::decode(response).await?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
                provider: "ollama".into(),
                max_context: 0,
            })
            .collect())
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
    model: String,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModelEntry>,
}

#[derive(Deserialize)]
struct OllamaModelEntry {
    name: String,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let system_prompt = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let body = OllamaRequest {
            model: request.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let req = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body);

        let response = match http::send(req, self.timeout_secs).await {
            Ok(response) => response,
            Err(ProviderError::ModelNotFound(_)) => {
                return Err(ProviderError::ModelNotFound(format!(
                    "Model '{}' not found locally. Pull it with: ollama pull {}",
                    request.model, request.model
                ))
                .into());
            }
            Err(ProviderError::NetworkError(_)) => return Err(self.unreachable().into()),
            Err(e) => return Err(e.into()),
        };

        let api_response: OllamaResponse = http::decode(response).await?;

        Ok(GenerateResponse {
            content: api_response.message.content,
            model: api_response.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        // Listing is async; `list_models_async` queries the running instance.
        vec![]
    }
}
