//! Configuration for Pulse services.
//!
//! A single JSON config file at `~/.pulse/config.json` (overridable via
//! `PULSE_CONFIG_PATH`) shared by all services in the workspace.
//!
//! # Priority
//!
//! 1. Environment variables (secrets only)
//! 2. Explicit config file values
//! 3. Defaults
//!
//! # Environment variable mapping
//!
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY` → secrets.llm.google
//! - `PULSE_CONFIG_PATH` → config file location

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::CommonError;

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("PULSE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    directories::UserDirs::new()
        .map_or_else(
            || PathBuf::from(".pulse"),
            |dirs| dirs.home_dir().join(".pulse"),
        )
        .join("config.json")
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Secrets
// ============================================================================

/// Grouped secrets, organized by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// LLM provider API keys
    #[serde(default)]
    pub llm: LlmSecretsConfig,
}

/// LLM provider API keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSecretsConfig {
    /// Google Gemini API key
    #[serde(default)]
    pub google: Option<String>,
}

// ============================================================================
// Report service
// ============================================================================

/// Configuration for the market report service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Page-load timeout for scrapes, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Maximum attempts per single-source scrape
    #[serde(default = "default_retry_attempts")]
    pub retry_max_attempts: u32,
    /// Fixed backoff between retry attempts, in seconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
    /// Override the sector data source URL
    #[serde(default)]
    pub sector_url: Option<String>,
    /// Override the institutional (FII/DII) source URLs
    #[serde(default)]
    pub institutional_urls: Option<Vec<String>>,
    /// Override the news source URLs
    #[serde(default)]
    pub news_urls: Option<Vec<String>>,
    /// Override the market overview index symbols
    #[serde(default)]
    pub overview_symbols: Option<Vec<String>>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            retry_max_attempts: default_retry_attempts(),
            retry_backoff_secs: default_retry_backoff(),
            sector_url: None,
            institutional_urls: None,
            news_urls: None,
            overview_symbols: None,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    5
}

// ============================================================================
// Top-level config
// ============================================================================

/// Unified configuration for Pulse services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Secrets (API keys)
    #[serde(default)]
    pub secrets: SecretsConfig,
    /// Report service configuration
    #[serde(default)]
    pub report: Option<ReportConfig>,
}

impl Config {
    /// Load configuration from disk, falling back to defaults when the
    /// config file does not exist. Environment variables override secrets.
    pub fn load() -> Result<Self, CommonError> {
        let path = config_path();

        let mut config = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| CommonError::ConfigRead {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| CommonError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment-variable overrides for secrets.
    fn apply_env_overrides(&mut self) {
        for var in ["GEMINI_API_KEY", "GOOGLE_API_KEY"] {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    self.secrets.llm.google = Some(key);
                    break;
                }
            }
        }
    }

    /// Get the Gemini API key, if configured.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.secrets.llm.google.as_deref()
    }

    /// Get the report configuration, or defaults when absent.
    pub fn report_config(&self) -> ReportConfig {
        self.report.clone().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "info");
        assert!(config.gemini_api_key().is_none());
        assert_eq!(config.report_config().retry_max_attempts, 2);
    }

    #[test]
    fn test_parse_partial_config() {
        let raw = r#"{
            "observability": {"log_level": "debug"},
            "report": {"fetch_timeout_secs": 10}
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "pretty");

        let report = config.report_config();
        assert_eq!(report.fetch_timeout_secs, 10);
        assert_eq!(report.retry_backoff_secs, 5);
    }

    #[test]
    fn test_load_from_env_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"observability": {"log_level": "warn"}}"#).unwrap();

        std::env::set_var("PULSE_CONFIG_PATH", &path);
        let config = Config::load().unwrap();
        std::env::remove_var("PULSE_CONFIG_PATH");

        assert_eq!(config.observability.log_level, "warn");
    }

    #[test]
    fn test_secrets_from_file() {
        let raw = r#"{"secrets": {"llm": {"google": "test-key"}}}"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.gemini_api_key(), Some("test-key"));
    }
}
