pub mod anthropic;
pub mod client;
pub mod openai;

use std::sync::Arc;

pub use client::LlmClient;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::keys::ApiKeys;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    /// Optional system instructions. Empty means the request carries only
    /// the user message.
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stage: String,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
    pub provider: String,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;

    /// Base URL requests are sent to, when the provider talks HTTP.
    fn endpoint(&self) -> Option<&str> {
        None
    }
}

/// Builds the provider named in configuration. `api_base` replaces the
/// provider's default endpoint for groq and openai.
pub fn build_provider(
    name: &str,
    api_base: Option<&str>,
    config: &Config,
    keys: &ApiKeys,
) -> AppResult<Arc<dyn Provider>> {
    let provider: Arc<dyn Provider> = match name {
        "groq" => Arc::new(openai::OpenAIProvider::new_groq(
            keys.for_provider("groq")?,
            api_base,
        )),
        "openai" => Arc::new(openai::OpenAIProvider::new(
            keys.for_provider("openai")?,
            api_base,
        )),
        "ollama" => Arc::new(openai::OpenAIProvider::new_ollama(&config.ollama_base_url)),
        "anthropic" => Arc::new(anthropic::AnthropicProvider::new(
            keys.for_provider("anthropic")?,
        )),
        other => {
            return Err(AppError::Config(format!("unknown LLM provider: {other}")));
        }
    };
    Ok(provider)
}

pub fn build_client(config: &Config, keys: &ApiKeys) -> AppResult<LlmClient> {
    // LLM_BASE_URL belongs to the primary provider only.
    let primary = build_provider(
        &config.llm_provider,
        config.llm_base_url.as_deref(),
        config,
        keys,
    )?;

    let fallback = match config.fallback_provider.as_str() {
        "" | "none" => None,
        name => Some(build_provider(name, None, config, keys)?),
    };

    tracing::info!(
        primary_provider = %config.llm_provider,
        primary_endpoint = primary.endpoint().unwrap_or_default(),
        fallback_provider = %config.fallback_provider,
        model = %config.llm_model,
        max_attempts = config.llm_max_attempts,
        "LLM client initialized"
    );

    Ok(LlmClient {
        primary,
        fallback,
        primary_provider: config.llm_provider.clone(),
        fallback_provider: config.fallback_provider.clone(),
        fallback_model: config.fallback_model.clone(),
        max_attempts: config.llm_max_attempts,
    })
}

/// Pulls a JSON document out of a model reply, which may wrap it in a
/// markdown code fence or surrounding prose.
pub fn extract_json(content: &str) -> String {
    if let Some(start) = content.find("```json")
        && let Some(end) = content[start + 7..].find("```")
    {
        return content[start + 7..start + 7 + end].trim().to_string();
    }
    if let Some(start) = content.find("```")
        && let Some(end) = content[start + 3..].find("```")
    {
        let inner = content[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') || inner.starts_with('[') {
            return inner.to_string();
        }
    }
    let object = content.find('{').zip(content.rfind('}'));
    let array = content.find('[').zip(content.rfind(']'));
    let span = match (object, array) {
        (Some(o), Some(a)) => Some(if a.0 < o.0 { a } else { o }),
        (o, a) => o.or(a),
    };
    if let Some((start, end)) = span
        && start < end
    {
        return content[start..=end].to_string();
    }
    content.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_raw_object() {
        let input = r#"{"entities": []}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn test_extract_json_markdown_block() {
        let input = "Here you go:\n```json\n[{\"text\": \"Pixel 8\"}]\n```\nDone.";
        assert_eq!(extract_json(input), "[{\"text\": \"Pixel 8\"}]");
    }

    #[test]
    fn test_extract_json_generic_code_block() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_array_embedded_in_text() {
        let input = "Entities: [{\"text\": \"Vivo\", \"label\": \"ORG\"}] end";
        assert_eq!(
            extract_json(input),
            "[{\"text\": \"Vivo\", \"label\": \"ORG\"}]"
        );
    }

    #[test]
    fn test_extract_json_no_json() {
        let input = "No JSON here at all";
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn test_build_provider_rejects_unknown() {
        let err = build_provider("mystery", None, &Config::default(), &ApiKeys::default())
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_build_client_without_fallback() {
        let config = Config {
            llm_provider: "ollama".to_string(),
            ..Config::default()
        };
        let client = build_client(&config, &ApiKeys::default()).unwrap();
        assert!(client.fallback.is_none());
        assert_eq!(client.primary.name(), "ollama");
        assert_eq!(client.max_attempts, 1);
    }

    #[test]
    fn test_anthropic_as_fallback() {
        let config = Config {
            llm_provider: "ollama".to_string(),
            fallback_provider: "anthropic".to_string(),
            ..Config::default()
        };
        let keys = ApiKeys {
            anthropic: Some("anthropic-key".to_string()),
            ..ApiKeys::default()
        };

        let client = build_client(&config, &keys).unwrap();
        let fallback = client.fallback.as_ref().unwrap();
        assert_eq!(fallback.name(), "anthropic");
        assert_eq!(fallback.endpoint(), Some("https://api.anthropic.com"));
    }

    #[test]
    fn test_base_url_override_applies_to_primary_only() {
        let config = Config {
            llm_provider: "groq".to_string(),
            llm_base_url: Some("http://gateway.internal/v1".to_string()),
            fallback_provider: "openai".to_string(),
            ..Config::default()
        };
        let keys = ApiKeys {
            groq: Some("groq-key".to_string()),
            openai: Some("openai-key".to_string()),
            ..ApiKeys::default()
        };

        let client = build_client(&config, &keys).unwrap();
        assert_eq!(client.primary.endpoint(), Some("http://gateway.internal/v1"));
        let fallback = client.fallback.as_ref().unwrap();
        assert_eq!(fallback.name(), "openai");
        assert_eq!(fallback.endpoint(), Some(openai::OPENAI_API_BASE));
    }
}
