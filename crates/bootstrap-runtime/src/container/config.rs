//! # Runtime Settings
//!
//! Process-level settings read from the environment before any configuration
//! file is touched: where the application lives, which environment it runs
//! in, how the process was invoked and the runtime's error settings.
//!
//! ## Environment Variables
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `BOOTSTRAP_APP_PATH` | application directory | `./app` |
//! | `BOOTSTRAP_ENV` | `development`, `testing` or `production` | `development` |
//! | `BOOTSTRAP_SAPI` | `cli`, `cgi-fcgi`, `server`, ... | detected |
//! | `BOOTSTRAP_DISPLAY_ERRORS` | display-errors setting | per environment |
//! | `BOOTSTRAP_ERROR_REPORTING` | reporting mask (`E_ALL & ~E_NOTICE`, `32767`) | per environment |
//! | `SERVER_PROTOCOL` | protocol of the status line | `HTTP/1.1` |
//! | `GATEWAY_INTERFACE` | set by CGI servers; selects CGI when `BOOTSTRAP_SAPI` is unset | - |

use bootstrap_types::{Halt, Interface, Severity};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Application environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }

    /// Display-errors value used when the process does not set one.
    #[must_use]
    pub fn default_display_errors(self) -> &'static str {
        match self {
            Self::Development => "1",
            Self::Testing | Self::Production => "0",
        }
    }

    /// Reporting mask used when the process does not set one.
    #[must_use]
    pub fn default_error_reporting(self) -> Severity {
        match self {
            Self::Development => Severity::ALL,
            Self::Testing | Self::Production => Severity::PRODUCTION,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "testing" => Ok(Self::Testing),
            "production" => Ok(Self::Production),
            other => Err(other.to_string()),
        }
    }
}

/// Settings that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("BOOTSTRAP_SAPI: {0}")]
    Interface(String),

    #[error("BOOTSTRAP_ERROR_REPORTING: {0}")]
    ErrorReporting(String),
}

/// Complete runtime settings.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Application directory; configuration lives under `<app>/config`.
    pub app_path: PathBuf,
    /// Environment name as given. Checked by [`RuntimeSettings::environment`].
    pub environment: String,
    pub interface: Interface,
    pub server_protocol: String,
    /// Explicit display-errors value; the environment default otherwise.
    pub display_errors: Option<String>,
    /// Explicit reporting mask; the environment default otherwise.
    pub error_reporting: Option<Severity>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            app_path: PathBuf::from("./app"),
            environment: Environment::Development.as_str().to_string(),
            interface: Interface::Cli,
            server_protocol: "HTTP/1.1".to_string(),
            display_errors: None,
            error_reporting: None,
        }
    }
}

impl RuntimeSettings {
    /// Load from environment variables.
    ///
    /// # Errors
    ///
    /// An interface name or reporting mask that does not parse.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any variable source.
    ///
    /// # Errors
    ///
    /// An interface name or reporting mask that does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(path) = lookup("BOOTSTRAP_APP_PATH") {
            settings.app_path = PathBuf::from(path);
        }
        if let Some(environment) = lookup("BOOTSTRAP_ENV") {
            settings.environment = environment;
        }

        settings.interface = match lookup("BOOTSTRAP_SAPI") {
            Some(sapi) => sapi.parse().map_err(SettingsError::Interface)?,
            None if lookup("GATEWAY_INTERFACE").is_some() => Interface::Cgi,
            None => Interface::Cli,
        };

        if let Some(protocol) = lookup("SERVER_PROTOCOL") {
            settings.server_protocol = protocol;
        }
        settings.display_errors = lookup("BOOTSTRAP_DISPLAY_ERRORS");
        if let Some(mask) = lookup("BOOTSTRAP_ERROR_REPORTING") {
            let mask = mask
                .parse::<Severity>()
                .map_err(|e| SettingsError::ErrorReporting(e.to_string()))?;
            settings.error_reporting = Some(mask);
        }

        Ok(settings)
    }

    /// The validated environment.
    ///
    /// # Errors
    ///
    /// [`Halt::Environment`] when the name is not one of the three known
    /// environments.
    pub fn environment(&self) -> Result<Environment, Halt> {
        self.environment
            .parse()
            .map_err(|environment| Halt::Environment { environment })
    }

    /// Display-errors value in effect, falling back to the environment
    /// default (or "off" when the environment itself is invalid).
    pub fn effective_display_errors(&self) -> String {
        match &self.display_errors {
            Some(value) => value.clone(),
            None => self
                .environment()
                .map_or("0", Environment::default_display_errors)
                .to_string(),
        }
    }

    /// Reporting mask in effect.
    pub fn effective_error_reporting(&self) -> Severity {
        self.error_reporting.unwrap_or_else(|| {
            self.environment()
                .map_or(Severity::PRODUCTION, Environment::default_error_reporting)
        })
    }
}
