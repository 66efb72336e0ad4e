//! # Configuration File Loader
//!
//! Reads `<app>/config/config.toml`, then overlays
//! `<app>/config/<environment>/config.toml` key by key. Either file may be
//! missing as long as one of them exists.
//!
//! # Config File Format
//!
//! ```toml
//! subclass_prefix = "MY_"
//! log_threshold = 1
//! log_path = "logs"
//! log_date_format = "%Y-%m-%d %H:%M:%S"
//!
//! [status_texts]
//! 404 = "Not Found"
//! 500 = "Internal Server Error"
//! ```

use bootstrap_types::{ConfigError, ConfigTable};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name looked up in each configuration directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Configuration loader for one application directory.
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    config_dir: PathBuf,
}

impl TomlConfigLoader {
    pub fn new(app_path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: app_path.as_ref().join("config"),
        }
    }

    /// Main configuration file.
    pub fn main_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Overlay file for `environment`.
    pub fn environment_path(&self, environment: &str) -> PathBuf {
        self.config_dir.join(environment).join(CONFIG_FILE)
    }

    /// Load the merged configuration for `environment`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] when neither file exists.
    /// - [`ConfigError::Malformed`] when a file is not a TOML table.
    /// - [`ConfigError::Io`] when a file exists but cannot be read.
    pub fn load(&self, environment: &str) -> Result<ConfigTable, ConfigError> {
        let main_path = self.main_path();
        let overlay_path = self.environment_path(environment);

        let main = Self::read(&main_path)?;
        let overlay = Self::read(&overlay_path)?;

        let values = match (main, overlay) {
            (None, None) => {
                return Err(ConfigError::Missing {
                    path: main_path.display().to_string(),
                })
            }
            (Some(main), None) => main,
            (None, Some(overlay)) => overlay,
            (Some(mut main), Some(overlay)) => {
                debug!(
                    "[Config] Overlaying {} keys from {}",
                    overlay.len(),
                    overlay_path.display()
                );
                main.extend(overlay);
                main
            }
        };

        info!(
            "[Config] Loaded {} items for environment {}",
            values.len(),
            environment
        );
        Ok(ConfigTable::new(values))
    }

    /// Parse configuration text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Malformed`] when `content` is not a TOML table.
    pub fn parse(path: &Path, content: &str) -> Result<toml::Table, ConfigError> {
        content
            .parse::<toml::Table>()
            .map_err(|e| ConfigError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn read(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(path, &content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
