use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Overrides the embedded vocabulary when set.
    pub vocabulary_path: Option<PathBuf>,
    /// Caller-visible bound on one whole analysis.
    pub request_timeout: Duration,
    /// Tighter bound on the augmentation call, joined at response assembly.
    pub augmentation_timeout: Duration,
    pub ollama_enabled: bool,
    pub ollama_base_url: String,
    pub ollama_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            vocabulary_path: None,
            request_timeout: Duration::from_secs(60),
            augmentation_timeout: Duration::from_secs(30),
            ollama_enabled: true,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            vocabulary_path: std::env::var("VOCABULARY_PATH").ok().map(PathBuf::from),
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            augmentation_timeout: Duration::from_secs(parse_env(
                "AUGMENTATION_TIMEOUT_SECS",
                defaults.augmentation_timeout.as_secs(),
            )?),
            ollama_enabled: parse_env("OLLAMA_ENABLED", defaults.ollama_enabled)?,
            ollama_base_url: std::env::var("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_augmentation_inside_request_timeout() {
        let config = Config::default();
        assert!(config.augmentation_timeout < config.request_timeout);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_parse_env_missing_uses_default() {
        let value: u64 = parse_env("ATS_API_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("ATS_API_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = parse_env("ATS_API_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("ATS_API_TEST_BAD_PORT");
    }
}
