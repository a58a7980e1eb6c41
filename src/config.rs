//! Configuration management for the Bottango client
//!
//! Handles loading, parsing, and validation of the YAML configuration file.
//! Every section is optional; missing values fall back to the defaults of a
//! local Bottango installation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bottango: BottangoConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bottango REST API endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BottangoConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Playback polling behavior
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Default timeout for waiting on an animation; `None` waits forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timeout_secs: Option<f64>,
}

/// Log output
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory of the log file; defaults to the platform log directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

impl Default for BottangoConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            wait_timeout_secs: None,
        }
    }
}

impl PlaybackConfig {
    /// `wait_timeout_secs` as a duration. Out-of-range values read as `None`,
    /// `validate` rejects them.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            file_name: default_log_file_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, or use the defaults if the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.bottango.host.trim().is_empty() {
            anyhow::bail!("bottango.host cannot be empty");
        }
        if self.bottango.port == 0 {
            anyhow::bail!("bottango.port must be between 1 and 65535");
        }
        if self.bottango.request_timeout_ms == 0 {
            anyhow::bail!("bottango.request_timeout_ms must be greater than 0");
        }

        if self.playback.poll_interval_ms == 0 {
            anyhow::bail!("playback.poll_interval_ms must be greater than 0");
        }
        if let Some(timeout) = self.playback.wait_timeout_secs {
            if timeout <= 0.0 || Duration::try_from_secs_f64(timeout).is_err() {
                anyhow::bail!(
                    "playback.wait_timeout_secs is invalid ({}), must be a positive number",
                    timeout
                );
            }
        }

        if self.logging.file_name.trim().is_empty() {
            anyhow::bail!("logging.file_name cannot be empty");
        }

        Ok(())
    }
}

// Default value functions
fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 59224 }
fn default_request_timeout_ms() -> u64 { 5000 }
fn default_poll_interval_ms() -> u64 { 20 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_file_name() -> String { "bottango_playback.log".to_string() }

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bottango.host, "localhost");
        assert_eq!(config.bottango.port, 59224);
        assert_eq!(config.playback.poll_interval_ms, 20);
        assert_eq!(config.playback.wait_timeout_secs, None);
        assert_eq!(config.logging.file_name, "bottango_playback.log");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("{}\n");
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let file = write_config(
            "bottango:\n  host: stage-pc\nplayback:\n  wait_timeout_secs: 12.5\n",
        );
        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(config.bottango.host, "stage-pc");
        assert_eq!(config.bottango.port, 59224);
        assert_eq!(config.playback.poll_interval_ms, 20);
        assert_eq!(config.playback.wait_timeout_secs, Some(12.5));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        for yaml in [
            "bottango:\n  host: ''\n",
            "bottango:\n  port: 0\n",
            "playback:\n  poll_interval_ms: 0\n",
            "playback:\n  wait_timeout_secs: -1\n",
            "logging:\n  file_name: ' '\n",
        ] {
            let file = write_config(yaml);
            assert!(AppConfig::load(file.path()).is_err(), "accepted: {}", yaml);
        }
    }

    #[test]
    fn test_wait_timeout_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.playback.wait_timeout_secs = Some(1e20);
        assert!(config.validate().is_err());
        assert_eq!(config.playback.wait_timeout(), None);

        let file = write_config("playback:\n  wait_timeout_secs: 1e20\n");
        assert!(AppConfig::load(file.path()).is_err());

        config.playback.wait_timeout_secs = Some(2.5);
        assert!(config.validate().is_ok());
        assert_eq!(config.playback.wait_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_malformed_yaml() {
        let file = write_config("bottango: [unclosed\n");
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML config"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bottango.yaml");

        let mut config = AppConfig::default();
        config.bottango.port = 60000;
        config.playback.wait_timeout_secs = Some(30.0);
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }
}
