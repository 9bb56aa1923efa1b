//! AutoScrum configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::LlmError;

/// Main AutoScrum configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Prompt template configuration
    pub prompts: PromptsConfig,

    /// Sprint calendar configuration
    pub planning: PlanningConfig,

    /// Conversation memory configuration
    pub memory: MemoryConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the API key environment variable is set. Call this early in
    /// startup to fail fast with a clear message.
    pub fn validate(&self) -> Result<()> {
        self.llm.api_key().map(|_| ()).map_err(|e| eyre::eyre!("{}", e))?;
        if self.planning.working_days == 0 {
            return Err(eyre::eyre!("planning.working-days must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .autoscrum.yml
        let local_config = PathBuf::from(".autoscrum.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/autoscrum/autoscrum.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed here; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from(".autoscrum.yml"))
                .chain(Self::user_config_path())
                .collect(),
        };

        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Config>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("autoscrum").join("autoscrum.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
///
/// `model`, `api-key-env` and `base-url` fall back to the provider's own
/// defaults when left unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" or "anthropic")
    pub provider: String,

    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// API base URL
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_key_env: None,
            base_url: None,
            max_tokens: 4096,
            temperature: 0.0,
            timeout_ms: 300_000,
        }
    }
}

/// Built-in settings for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub model: &'static str,
    pub api_key_env: &'static str,
    pub base_url: &'static str,
}

pub const OPENAI_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "gpt-4",
    api_key_env: "OPENAI_API_KEY",
    base_url: "https://api.openai.com",
};

pub const ANTHROPIC_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "claude-sonnet-4-20250514",
    api_key_env: "ANTHROPIC_API_KEY",
    base_url: "https://api.anthropic.com",
};

impl LlmConfig {
    /// Defaults for the configured provider; unknown providers get OpenAI's
    pub fn provider_defaults(&self) -> ProviderDefaults {
        match self.provider.as_str() {
            "anthropic" => ANTHROPIC_DEFAULTS,
            _ => OPENAI_DEFAULTS,
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.provider_defaults().model)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.provider_defaults().api_key_env)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.provider_defaults().base_url)
            .trim_end_matches('/')
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, LlmError> {
        let env_var = self.api_key_env();
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LlmError::MissingApiKey(env_var.to_string())),
        }
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory holding `{name}.txt` templates
    pub dir: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("prompts"),
        }
    }
}

/// Sprint calendar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Number of working days in a sprint
    #[serde(rename = "working-days")]
    pub working_days: usize,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self { working_days: 10 }
    }
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Append each agent exchange to the shared memory
    #[serde(rename = "record-exchanges")]
    pub record_exchanges: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { record_exchanges: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model(), "gpt-4");
        assert_eq!(config.llm.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.llm.base_url(), "https://api.openai.com");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.planning.working_days, 10);
        assert!(config.memory.record_exchanges);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

llm:
  provider: anthropic
  model: claude-sonnet-4-20250514
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 8192
  temperature: 0.3
  timeout-ms: 60000

prompts:
  dir: /etc/autoscrum/prompts

planning:
  working-days: 5

memory:
  record-exchanges: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env(), "MY_API_KEY");
        assert_eq!(config.llm.base_url(), "https://api.example.com");
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.prompts.dir, PathBuf::from("/etc/autoscrum/prompts"));
        assert_eq!(config.planning.working_days, 5);
        assert!(!config.memory.record_exchanges);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4o
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model(), "gpt-4o");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.planning.working_days, 10);
    }

    #[test]
    fn test_anthropic_provider_gets_its_own_defaults() {
        let config: Config = serde_yaml::from_str("llm:\n  provider: anthropic\n").unwrap();

        assert_eq!(config.llm.model(), "claude-sonnet-4-20250514");
        assert_eq!(config.llm.api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.base_url(), "https://api.anthropic.com");
    }

    #[test]
    fn test_explicit_settings_override_provider_defaults() {
        let yaml = "llm:\n  provider: anthropic\n  api-key-env: MY_KEY\n  base-url: http://localhost:8080/\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model(), "claude-sonnet-4-20250514");
        assert_eq!(config.llm.api_key_env(), "MY_KEY");
        assert_eq!(config.llm.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yml");
        fs::write(&path, "planning:\n  working-days: 3\nlog-level: WARN\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.planning.working_days, 3);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let path = PathBuf::from("/nonexistent/autoscrum.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    #[serial]
    fn test_validate_requires_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = Some("AUTOSCRUM_TEST_VALIDATE_KEY".to_string());

        // SAFETY: serialized with every other test that touches the environment
        unsafe { std::env::remove_var("AUTOSCRUM_TEST_VALIDATE_KEY") };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("AUTOSCRUM_TEST_VALIDATE_KEY"));

        unsafe { std::env::set_var("AUTOSCRUM_TEST_VALIDATE_KEY", "   ") };
        assert!(config.validate().is_err());

        unsafe { std::env::set_var("AUTOSCRUM_TEST_VALIDATE_KEY", "sk-live") };
        assert!(config.validate().is_ok());
        unsafe { std::env::remove_var("AUTOSCRUM_TEST_VALIDATE_KEY") };
    }

    #[test]
    #[serial]
    fn test_validate_rejects_zero_working_days() {
        let mut config = Config::default();
        config.llm.api_key_env = Some("AUTOSCRUM_TEST_DAYS_KEY".to_string());
        config.planning.working_days = 0;
        unsafe { std::env::set_var("AUTOSCRUM_TEST_DAYS_KEY", "sk-live") };
        assert!(config.validate().is_err());
        unsafe { std::env::remove_var("AUTOSCRUM_TEST_DAYS_KEY") };
    }
}
