//! Server and reasoning-backend configuration.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Env vars that may carry the API key when `CIVIC_LLM_API_KEY` is not set.
pub const API_KEY_FALLBACK_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Figment(String),

    #[error("no API key configured for the gemini backend (set CIVIC_LLM_API_KEY or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Gemini,
    Ollama,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: Option<String>,
    /// Backend default when unset.
    pub model: Option<String>,
    pub api_base: Option<String>,
}

/// Config with the API key masked, safe to log.
#[derive(Debug, Serialize)]
pub struct SanitizedConfig {
    pub host: IpAddr,
    pub port: u16,
    pub backend: LlmBackend,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub api_key_set: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.server.host,
            port: config.server.port,
            backend: config.llm.backend,
            model: config.llm.model.clone(),
            api_base: config.llm.api_base.clone(),
            api_key_set: config.llm.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()),
        }
    }
}

/// Load configuration from an optional TOML file with `CIVIC_` environment overrides.
///
/// `CIVIC_SERVER_PORT` maps to `server.port`, `CIVIC_LLM_API_KEY` to `llm.api_key`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    }
    let mut config: Config = figment
        .merge(Env::prefixed("CIVIC_").map(|key| key.as_str().replacen('_', ".", 1).into()))
        .extract()
        .map_err(|e| ConfigError::Figment(e.to_string()))?;

    apply_api_key_fallback(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Toml::string(toml_str))
        .extract()
        .map_err(|e| ConfigError::Figment(e.to_string()))
}

fn apply_api_key_fallback(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if config.llm.api_key.is_some() {
        return;
    }
    config.llm.api_key = API_KEY_FALLBACK_VARS
        .iter()
        .find_map(|&name| lookup(name).filter(|v| !v.trim().is_empty()));
}

/// Validate configuration. Fails fast on a missing Gemini key instead of
/// letting the first request fail.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Validation("server.port cannot be 0".to_string()));
    }

    if config.llm.backend == LlmBackend::Gemini
        && config.llm.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
    {
        return Err(ConfigError::MissingApiKey);
    }

    if let Some(model) = &config.llm.model {
        if model.trim().is_empty() {
            return Err(ConfigError::Validation("llm.model cannot be blank".to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.backend, LlmBackend::Gemini);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[llm]
backend = "ollama"
model = "mistral"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.llm.model.as_deref(), Some("mistral"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = load_config_from_str("[llm]\nbackend = \"palm\"\n");
        assert!(matches!(result, Err(ConfigError::Figment(_))));
    }

    #[test]
    fn test_gemini_without_key_fails_fast() {
        let config = Config::default();
        assert!(matches!(validate_config(&config), Err(ConfigError::MissingApiKey)));

        let mut blank = Config::default();
        blank.llm.api_key = Some("   ".to_string());
        assert!(matches!(validate_config(&blank), Err(ConfigError::MissingApiKey)));

        let mut ok = Config::default();
        ok.llm.api_key = Some("secret".to_string());
        assert!(validate_config(&ok).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.llm.api_key = Some("secret".to_string());
        config.server.port = 0;
        assert!(matches!(validate_config(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_api_key_fallback_order() {
        let mut config = Config::default();
        apply_api_key_fallback(&mut config, |name| match name {
            "GEMINI_API_KEY" => Some("from-gemini".to_string()),
            "API_KEY" => Some("from-generic".to_string()),
            _ => None,
        });
        assert_eq!(config.llm.api_key.as_deref(), Some("from-gemini"));

        let mut config = Config::default();
        apply_api_key_fallback(&mut config, |name| (name == "API_KEY").then(|| "k".to_string()));
        assert_eq!(config.llm.api_key.as_deref(), Some("k"));

        let mut explicit = Config::default();
        explicit.llm.api_key = Some("explicit".to_string());
        apply_api_key_fallback(&mut explicit, |_| Some("ignored".to_string()));
        assert_eq!(explicit.llm.api_key.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
port = 3000

[llm]
api_key = "file-key"
api_base = "http://127.0.0.1:8081"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.api_base.as_deref(), Some("http://127.0.0.1:8081"));
    }

    #[test]
    fn test_sanitized_config_hides_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("secret".to_string());
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.api_key_set);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
