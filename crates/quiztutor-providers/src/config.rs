//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quiztutor_core::generator::GenerationConfig;
use quiztutor_core::traits::LlmProvider;

use crate::gemini::GeminiProvider;
use crate::mock::{MockProvider, MockReply};
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    /// Scripted replies; no network access.
    Mock {
        /// Replies cycled for prompts no rule matches.
        #[serde(default)]
        responses: Vec<String>,
        /// Checked in file order; the first needle found in the prompt answers.
        #[serde(default)]
        rules: Vec<MockRuleConfig>,
    },
}

/// One `[[providers.<name>.rules]]` table of a mock provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockRuleConfig {
    /// Prompt substring this rule answers.
    pub needle: String,
    /// Replies cycled for matching prompts.
    pub replies: Vec<String>,
}

impl ProviderConfig {
    /// Model used when neither the command line nor the config names one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderConfig::Gemini { .. } => "gemini-1.5-pro-latest",
            ProviderConfig::OpenAI { .. } => "gpt-4.1-mini",
            ProviderConfig::Ollama { .. } => "llama3.1:8b",
            ProviderConfig::Mock { .. } => "mock-model",
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                timeout_secs,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
                timeout_secs,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .field("timeout_secs", timeout_secs)
                .finish(),
            ProviderConfig::Ollama {
                base_url,
                timeout_secs,
            } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            ProviderConfig::Mock { responses, rules } => f
                .debug_struct("Mock")
                .field("responses", &responses.len())
                .field(
                    "rules",
                    &rules.iter().map(|r| r.needle.as_str()).collect::<Vec<_>>(),
                )
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level quiztutor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizTutorConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model for the default provider; unset means that provider's own default.
    #[serde(default)]
    pub default_model: Option<String>,
    /// Sampling temperature for questions, hints, and follow-ups.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Max tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Generation attempts before a duplicate question is accepted.
    #[serde(default = "default_dedup_attempts")]
    pub dedup_attempts: u32,
    /// Log every prompt sent to the model.
    #[serde(default)]
    pub echo_prompts: bool,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_dedup_attempts() -> u32 {
    5
}

impl Default for QuizTutorConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            dedup_attempts: default_dedup_attempts(),
            echo_prompts: false,
        }
    }
}

impl QuizTutorConfig {
    /// Resolve the model for `provider`.
    ///
    /// An explicit `model` wins, then `default_model` when `provider` is the
    /// default provider, then the provider type's own default.
    pub fn model_for(&self, provider: &str, model: Option<&str>) -> String {
        if let Some(model) = model {
            return model.to_string();
        }
        if provider == self.default_provider {
            if let Some(model) = &self.default_model {
                return model.clone();
            }
        }
        self.providers
            .get(provider)
            .map_or(GenerationConfig::default().model, |p| {
                p.default_model().to_string()
            })
    }

    /// Generation settings for `provider`, using [`Self::model_for`].
    pub fn generation_config(&self, provider: &str, model: Option<&str>) -> GenerationConfig {
        GenerationConfig {
            model: self.model_for(provider, model),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            system_prompt: None,
            echo_prompts: self.echo_prompts,
            dedup_attempts: self.dedup_attempts,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            timeout_secs,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            timeout_secs: *timeout_secs,
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
            timeout_secs,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
            timeout_secs: *timeout_secs,
        },
        ProviderConfig::Ollama {
            base_url,
            timeout_secs,
        } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
            timeout_secs: *timeout_secs,
        },
        ProviderConfig::Mock { .. } => config.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quiztutor.toml` in the current directory
/// 2. `~/.config/quiztutor/config.toml`
///
/// Environment variable overrides: `QUIZTUTOR_GEMINI_KEY`, `QUIZTUTOR_OPENAI_KEY`.
pub fn load_config() -> Result<QuizTutorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizTutorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quiztutor.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizTutorConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("QUIZTUTOR_GEMINI_KEY") {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                timeout_secs: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("QUIZTUTOR_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
                timeout_secs: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

/// Parse a TOML configuration string.
pub fn parse_config(content: &str) -> Result<QuizTutorConfig> {
    let config: QuizTutorConfig = toml::from_str(content)?;
    anyhow::ensure!(
        (0.0..=2.0).contains(&config.temperature),
        "temperature must be between 0.0 and 2.0"
    );
    anyhow::ensure!(config.dedup_attempts >= 1, "dedup_attempts must be at least 1");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quiztutor"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            timeout_secs,
        } => {
            anyhow::ensure!(
                !api_key.is_empty(),
                "gemini api_key is empty; set QUIZTUTOR_GEMINI_KEY or edit quiztutor.toml"
            );
            Ok(Box::new(GeminiProvider::new(
                api_key,
                base_url.clone(),
                *timeout_secs,
            )?))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
            timeout_secs,
        } => Ok(Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
            *timeout_secs,
        )?)),
        ProviderConfig::Ollama {
            base_url,
            timeout_secs,
        } => Ok(Box::new(OllamaProvider::new(base_url, *timeout_secs)?)),
        ProviderConfig::Mock { responses, rules } => {
            let mut provider = MockProvider::with_responses(responses.clone());
            for rule in rules {
                provider = provider.on_sequence(
                    &rule.needle,
                    rule.replies.iter().cloned().map(MockReply::Text).collect(),
                );
            }
            Ok(Box::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiztutor_core::traits::GenerateRequest;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZTUTOR_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZTUTOR_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZTUTOR_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZTUTOR_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizTutorConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.dedup_attempts, 5);
        assert!(!config.echo_prompts);

        let generation = config.generation_config("gemini", None);
        assert_eq!(generation.model, "gemini-1.5-pro-latest");
        assert_eq!(
            config.generation_config("gemini", Some("gpt-4.1")).model,
            "gpt-4.1"
        );
    }

    #[test]
    fn model_follows_the_selected_provider() {
        let config = parse_config(
            r#"
default_provider = "gemini"
default_model = "gemini-2.0-flash"

[providers.gemini]
type = "gemini"
api_key = "g-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.ollama]
type = "ollama"
"#,
        )
        .unwrap();

        assert_eq!(config.model_for("gemini", None), "gemini-2.0-flash");
        assert_eq!(config.model_for("openai", None), "gpt-4.1-mini");
        assert_eq!(config.model_for("ollama", None), "llama3.1:8b");
        assert_eq!(config.model_for("ollama", Some("mistral:7b")), "mistral:7b");
    }

    #[test]
    fn default_model_unset_uses_provider_default() {
        let config = parse_config(
            "default_provider = \"openai\"\n\n[providers.openai]\ntype = \"openai\"\napi_key = \"k\"\n",
        )
        .unwrap();
        assert_eq!(config.default_model, None);
        assert_eq!(config.generation_config("openai", None).model, "gpt-4.1-mini");
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "gemini"
default_model = "gemini-1.5-flash-latest"
echo_prompts = true

[providers.gemini]
type = "gemini"
api_key = "g-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.ollama]
type = "ollama"

[providers.mock]
type = "mock"
responses = ["Q?\nA. 1\nB. 2\nC. 3\nD. 4\nAnswer: A"]

[[providers.mock.rules]]
needle = "hint for this quiz question"
replies = ["Think small."]
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.providers.len(), 4);
        assert!(config.echo_prompts);
        assert_eq!(config.default_model.as_deref(), Some("gemini-1.5-flash-latest"));
        assert!(matches!(
            config.providers.get("ollama"),
            Some(ProviderConfig::Ollama { base_url, .. }) if base_url == "http://localhost:11434"
        ));
        assert!(matches!(
            config.providers.get("mock"),
            Some(ProviderConfig::Mock { rules, .. }) if rules.len() == 1
        ));
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::Gemini {
            api_key: "super-secret".into(),
            base_url: None,
            timeout_secs: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        assert!(parse_config("temperature = 3.5").is_err());
        assert!(parse_config("dedup_attempts = 0").is_err());
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiztutor.toml");
        std::fs::write(&path, "default_provider = \"mock\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "mock");
        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn empty_gemini_key_is_rejected() {
        let config = ProviderConfig::Gemini {
            api_key: String::new(),
            base_url: None,
            timeout_secs: None,
        };
        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn creates_mock_provider() {
        let config = ProviderConfig::Mock {
            responses: vec!["hello".into()],
            rules: vec![],
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[tokio::test]
    async fn mock_rules_keep_file_order() {
        let config = parse_config(
            r#"
[providers.mock]
type = "mock"
responses = ["fallback"]

[[providers.mock.rules]]
needle = "zebra"
replies = ["zebra rule"]

[[providers.mock.rules]]
needle = "a"
replies = ["a rule"]
"#,
        )
        .unwrap();

        let provider_config = &config.providers["mock"];
        assert!(format!("{provider_config:?}").contains(r#"["zebra", "a"]"#));

        let provider = create_provider(provider_config).unwrap();
        let request = GenerateRequest {
            model: "mock-model".into(),
            prompt: "a zebra".into(),
            system_prompt: None,
            max_tokens: 16,
            temperature: 0.0,
        };
        let response = provider.generate(&request).await.unwrap();
        assert_eq!(response.content, "zebra rule");
    }
}
