use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub data_dir: PathBuf,
    pub api_keys_path: PathBuf,
    pub newsapi_base_url: String,
    /// `groq`, `openai`, `ollama` or `anthropic`.
    pub llm_provider: String,
    pub llm_model: String,
    /// Endpoint override for the primary provider.
    pub llm_base_url: Option<String>,
    /// Same choices as `llm_provider`, or `none`.
    pub fallback_provider: String,
    pub fallback_model: String,
    pub llm_max_attempts: u32,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub ner_backend: String,
    pub ollama_base_url: String,
    pub otel_enabled: bool,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            data_dir: PathBuf::from("."),
            api_keys_path: PathBuf::from("data/api_keys.json"),
            newsapi_base_url: "https://newsapi.org".to_string(),
            llm_provider: "groq".to_string(),
            llm_model: "llama-3.1-8b-instant".to_string(),
            llm_base_url: None,
            fallback_provider: "none".to_string(),
            fallback_model: "gpt-4.1-mini".to_string(),
            llm_max_attempts: 1,
            llm_temperature: 0.7,
            llm_max_tokens: 2048,
            ner_backend: "heuristic".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            otel_enabled: true,
            otel_service_name: "battlecard-generator".to_string(),
            otel_exporter_endpoint: "http://localhost:4317".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: parse_var("APP_PORT", defaults.port)?,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            api_keys_path: env::var("API_KEYS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.api_keys_path),
            newsapi_base_url: env::var("NEWSAPI_BASE_URL").unwrap_or(defaults.newsapi_base_url),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or(defaults.llm_provider),
            llm_model: env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_base_url: env::var("LLM_BASE_URL").ok().filter(|v| !v.is_empty()),
            fallback_provider: env::var("FALLBACK_PROVIDER").unwrap_or(defaults.fallback_provider),
            fallback_model: env::var("FALLBACK_MODEL").unwrap_or(defaults.fallback_model),
            llm_max_attempts: parse_var("LLM_MAX_ATTEMPTS", defaults.llm_max_attempts)?,
            llm_temperature: parse_var("LLM_TEMPERATURE", defaults.llm_temperature)?,
            llm_max_tokens: parse_var("LLM_MAX_TOKENS", defaults.llm_max_tokens)?,
            ner_backend: env::var("NER_BACKEND").unwrap_or(defaults.ner_backend),
            ollama_base_url: env::var("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            otel_enabled: parse_var("OTEL_ENABLED", defaults.otel_enabled)?,
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or(defaults.otel_service_name),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(defaults.otel_exporter_endpoint),
        };

        if config.llm_max_attempts == 0 {
            return Err(AppError::Config(
                "LLM_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Key file location; relative paths resolve against the data directory.
    pub fn resolved_api_keys_path(&self) -> PathBuf {
        self.data_dir.join(&self.api_keys_path)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} has an invalid value: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.llm_provider, "groq");
        assert_eq!(config.llm_max_attempts, 1);
        assert_eq!(config.ner_backend, "heuristic");
        assert!(!config.is_production());
    }

    #[test]
    fn test_relative_key_path_resolves_under_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/srv/battlecards"),
            ..Config::default()
        };
        assert_eq!(
            config.resolved_api_keys_path(),
            PathBuf::from("/srv/battlecards/data/api_keys.json")
        );
    }

    #[test]
    fn test_absolute_key_path_is_kept() {
        let config = Config {
            data_dir: PathBuf::from("/srv/battlecards"),
            api_keys_path: PathBuf::from("/etc/keys.json"),
            ..Config::default()
        };
        assert_eq!(
            config.resolved_api_keys_path(),
            PathBuf::from("/etc/keys.json")
        );
    }

    #[test]
    fn test_parse_var_missing_uses_default() {
        let value: u32 = parse_var("BATTLECARD_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
