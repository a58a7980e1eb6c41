//! Default locations of the config file and the log directory.
//!
//! ## Mode Detection
//!
//! - **Local mode**: if `bottango.yaml` exists in the current working
//!   directory, the config is read from there and logs go to `./logs`.
//! - **User mode** (default): the config lives in the platform config
//!   directory (`%APPDATA%\Bottango Playback`, `~/.config/bottango-playback`)
//!   and logs in the platform data directory.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Application name used for directories in user mode
#[cfg(windows)]
const APP_NAME: &str = "Bottango Playback";
#[cfg(not(windows))]
const APP_NAME: &str = "bottango-playback";

/// Config file name looked up in local mode
pub const CONFIG_FILE_NAME: &str = "bottango.yaml";

/// Application paths for config and logs.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Path to the configuration file (may not exist)
    pub config: PathBuf,
    /// Path to the logs directory
    pub logs_dir: PathBuf,
    /// Whether the config was found in the working directory
    pub is_local: bool,
}

impl AppPaths {
    /// Detect the appropriate paths based on environment.
    ///
    /// Note: This is called before logging is initialized.
    pub fn detect() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::detect_in(&cwd, dirs::config_dir(), dirs::data_dir())
    }

    fn detect_in(cwd: &Path, config_dir: Option<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        let cwd_config = cwd.join(CONFIG_FILE_NAME);
        if cwd_config.exists() {
            return Self {
                config: cwd_config,
                logs_dir: cwd.join("logs"),
                is_local: true,
            };
        }

        let config_dir = config_dir.unwrap_or_else(|| cwd.to_path_buf()).join(APP_NAME);
        let data_dir = data_dir.unwrap_or_else(|| cwd.to_path_buf()).join(APP_NAME);

        Self {
            config: config_dir.join(CONFIG_FILE_NAME),
            logs_dir: data_dir.join("logs"),
            is_local: false,
        }
    }

    /// Ensure the logs directory exists.
    pub fn ensure_logs_dir(logs_dir: &Path) -> std::io::Result<()> {
        if !logs_dir.exists() {
            debug!("Creating logs directory: {}", logs_dir.display());
            std::fs::create_dir_all(logs_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_mode_when_config_in_cwd() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join(CONFIG_FILE_NAME), "{}\n").unwrap();

        let paths = AppPaths::detect_in(cwd.path(), None, None);
        assert!(paths.is_local);
        assert_eq!(paths.config, cwd.path().join(CONFIG_FILE_NAME));
        assert_eq!(paths.logs_dir, cwd.path().join("logs"));
    }

    #[test]
    fn test_user_mode_uses_platform_dirs() {
        let cwd = tempfile::tempdir().unwrap();
        let config_dir = PathBuf::from("/cfg");
        let data_dir = PathBuf::from("/data");

        let paths = AppPaths::detect_in(cwd.path(), Some(config_dir), Some(data_dir));
        assert!(!paths.is_local);
        assert_eq!(paths.config, PathBuf::from("/cfg").join(APP_NAME).join(CONFIG_FILE_NAME));
        assert_eq!(paths.logs_dir, PathBuf::from("/data").join(APP_NAME).join("logs"));
    }

    #[test]
    fn test_ensure_logs_dir_creates_nested() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("a").join("logs");
        AppPaths::ensure_logs_dir(&logs).unwrap();
        assert!(logs.is_dir());
    }
}
