//! Google Gemini provider implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quiztutor_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo};

use crate::http;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs,
            client: http::build_client(timeout_secs)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Accept both `gemini-1.5-pro` and `models/gemini-1.5-pro`.
fn model_path(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_prompt.as_ref().map(|s| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: s.clone() }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let req = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url,
                model_path(&request.model)
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body);

        let response = http::send(req, self.timeout_secs).await?;
        let api_response: GeminiResponse = http::decode(response).await?;

        let content = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(GenerateResponse {
            content,
            model: api_response
                .model_version
                .unwrap_or_else(|| model_path(&request.model).to_string()),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "gemini-1.5-pro-latest".into(),
                name: "Gemini 1.5 Pro".into(),
                provider: "gemini".into(),
                max_context: 2_000_000,
            },
            ModelInfo {
                id: "gemini-1.5-flash-latest".into(),
                name: "Gemini 1.5 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_000_000,
            },
            ModelInfo {
                id: "gemini-2.0-flash".into(),
                name: "Gemini 2.0 Flash".into(),
                provider: "gemini".into(),
                max_context: 1_000_000,
            },
        ]
    }
}
