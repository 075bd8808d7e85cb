//! Configuration types for the aula engine.
//!
//! This module defines the configuration schema: the backend endpoint,
//! spoken playback, and where persistent state lives.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "AULA_API_KEY";

/// Main configuration for aula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoint settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Spoken playback settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Directory holding persistent state (welcome flag).
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Generate endpoint URL, without the key query parameter.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key appended to the endpoint URL. Overridden by
    /// [`API_KEY_ENV`] when that variable is set.
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Spoken playback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Whether replies are read aloud.
    #[serde(default = "default_speech_enabled")]
    pub enabled: bool,

    /// Locale tag passed to the playback backend.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Command and arguments used to speak; `{locale}` is substituted
    /// and the utterance text appended.
    #[serde(default = "default_speech_argv")]
    pub command_argv: Vec<String>,
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        .to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_speech_enabled() -> bool {
    true
}

fn default_locale() -> String {
    "es-ES".to_string()
}

fn default_speech_argv() -> Vec<String> {
    vec!["espeak-ng".into(), "-v".into(), "{locale}".into()]
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".aula")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            speech: SpeechConfig::default(),
            state_dir: default_state_dir(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_speech_enabled(),
            locale: default_locale(),
            command_argv: default_speech_argv(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Path of the welcome flag file under the state directory.
    pub fn welcome_flag_path(&self) -> PathBuf {
        self.state_dir.join("welcome_shown")
    }
}

impl BackendConfig {
    /// The API key, preferring the environment variable when set.
    pub fn resolved_api_key(&self) -> String {
        std::env::var(API_KEY_ENV).unwrap_or_else(|_| self.api_key.clone())
    }

    /// Full endpoint URL with the key query parameter, when a key is
    /// available.
    pub fn endpoint_url(&self) -> String {
        let key = self.resolved_api_key();
        if key.is_empty() {
            self.api_url.clone()
        } else {
            format!("{}?key={key}", self.api_url)
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.backend.api_url.contains("generateContent"));
        assert_eq!(config.backend.timeout_seconds, 30);
        assert!(config.speech.enabled);
        assert_eq!(config.speech.locale, "es-ES");
        assert_eq!(config.state_dir, PathBuf::from(".aula"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"backend":{"api_key":"secret"}}"#;
        let config: Config = serde_json::from_str(json).expect("parse config");
        assert_eq!(config.backend.api_key, "secret");
        assert_eq!(config.backend.timeout_seconds, 30);
        assert!(config.speech.enabled);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.backend.api_key = "abc".into();
        config.speech.enabled = false;
        config.save(&path).expect("save config");

        let loaded = Config::load(&path).expect("load config");
        assert_eq!(loaded.backend.api_key, "abc");
        assert!(!loaded.speech.enabled);
    }

    #[test]
    fn test_endpoint_url_with_and_without_key() {
        let mut backend = BackendConfig::default();
        // No key configured and (presumably) no env override in tests.
        if std::env::var(API_KEY_ENV).is_err() {
            assert_eq!(backend.endpoint_url(), backend.api_url);

            backend.api_key = "k123".into();
            let url = backend.endpoint_url();
            assert!(url.ends_with("?key=k123"));
        }
    }

    #[test]
    fn test_welcome_flag_path() {
        let config = Config::default();
        assert_eq!(
            config.welcome_flag_path(),
            PathBuf::from(".aula").join("welcome_shown")
        );
    }
}
