use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Credentials for the external services, read from the key file and
/// optionally overridden by environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub newsapi: Option<String>,
    #[serde(default)]
    pub groq: Option<String>,
    #[serde(default)]
    pub openai: Option<String>,
    #[serde(default)]
    pub anthropic: Option<String>,
}

const ENV_OVERRIDES: [&str; 4] = [
    "NEWSAPI_API_KEY",
    "GROQ_API_KEY",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
];

impl ApiKeys {
    /// Loads the key file. A missing file is tolerated only when every key
    /// can come from the environment instead; an unreadable or malformed
    /// file is always an error.
    pub fn load(path: &Path) -> AppResult<Self> {
        let from_file = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str::<ApiKeys>(&raw).map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "API key file is not valid JSON");
                AppError::KeyFile {
                    path: path.to_path_buf(),
                    reason: format!("not a valid JSON file: {e}"),
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !ENV_OVERRIDES.iter().any(|name| env::var(name).is_ok()) {
                    tracing::error!(path = %path.display(), "API key file not found");
                    return Err(AppError::KeyFile {
                        path: path.to_path_buf(),
                        reason: "file not found".to_string(),
                    });
                }
                tracing::warn!(
                    path = %path.display(),
                    "API key file not found, using environment variables"
                );
                ApiKeys::default()
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "API key file unreadable");
                return Err(AppError::KeyFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        Ok(from_file.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        let pick = |name: &str, current: Option<String>| {
            env::var(name).ok().filter(|v| !v.is_empty()).or(current)
        };
        Self {
            newsapi: pick("NEWSAPI_API_KEY", self.newsapi),
            groq: pick("GROQ_API_KEY", self.groq),
            openai: pick("OPENAI_API_KEY", self.openai),
            anthropic: pick("ANTHROPIC_API_KEY", self.anthropic),
        }
    }

    pub fn newsapi(&self) -> AppResult<&str> {
        require(self.newsapi.as_deref(), "newsapi")
    }

    /// Key for an LLM provider name as used in configuration.
    pub fn for_provider(&self, provider: &str) -> AppResult<&str> {
        match provider {
            "groq" => require(self.groq.as_deref(), "groq"),
            "openai" => require(self.openai.as_deref(), "openai"),
            "anthropic" => require(self.anthropic.as_deref(), "anthropic"),
            // Local providers do not authenticate.
            "ollama" => Ok("ollama"),
            other => Err(AppError::Config(format!("unknown LLM provider: {other}"))),
        }
    }
}

fn require<'a>(value: Option<&'a str>, name: &str) -> AppResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => {
            tracing::error!(key = name, "API key missing");
            Err(AppError::Config(format!("API key '{name}' is not configured")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"newsapi": "news-key", "groq": "groq-key"}}"#).unwrap();

        let keys = ApiKeys::load(file.path()).unwrap();
        assert!(keys.newsapi().is_ok());
        assert!(keys.for_provider("groq").is_ok());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "newsapi = nope").unwrap();

        let err = ApiKeys::load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::KeyFile { .. }));
        assert!(err.to_string().contains("not a valid JSON file"));
    }

    #[test]
    fn test_missing_key_is_reported() {
        let keys = ApiKeys {
            newsapi: Some("  ".to_string()),
            ..ApiKeys::default()
        };
        assert!(matches!(keys.newsapi(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let keys = ApiKeys::default();
        assert_eq!(keys.for_provider("ollama").unwrap(), "ollama");
    }

    #[test]
    fn test_unknown_provider() {
        let keys = ApiKeys::default();
        let err = keys.for_provider("mystery").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown LLM provider: mystery"
        );
    }
}
