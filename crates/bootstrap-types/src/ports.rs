//! # Ports
//!
//! Traits at the boundary of the bootstrap core. The host process is the only
//! port the core holds directly; the others are registry-managed components.

use crate::entities::{FailureRecord, Interface, Severity};
use crate::errors::Fault;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// HOST ENVIRONMENT
// =============================================================================

/// The process the framework runs in: how it was invoked, where output goes,
/// and the runtime's own error settings.
pub trait HostEnvironment: Send + Sync {
    fn interface(&self) -> Interface;

    fn is_cli(&self) -> bool {
        self.interface().is_cli()
    }

    /// Protocol used for the status line when not under CGI.
    fn server_protocol(&self) -> String {
        "HTTP/1.1".to_string()
    }

    /// Emit a header line, replacing any previous status. `code` is the
    /// response code the line carries.
    fn send_header(&self, line: &str, code: u16);

    /// Append to the response body (stdout under CLI).
    fn write_output(&self, text: &str);

    /// Raw value of the display-errors setting, if set at all.
    fn display_errors(&self) -> Option<String>;

    /// Severities that are reported; everything else is suppressed.
    fn error_reporting(&self) -> Severity;

    /// The last error the host recorded without being able to report it.
    fn last_error(&self) -> Option<FailureRecord>;
}

// =============================================================================
// LOGGER
// =============================================================================

/// Log levels understood by the framework logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 1,
    Debug = 2,
    Info = 3,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!("Unknown log level: {other}")),
        }
    }
}

/// Receives `(level, message)` pairs.
pub trait Logger: Send + Sync {
    /// Returns `false` when the message was filtered out or could not be
    /// written.
    fn write_log(&self, level: LogLevel, message: &str) -> bool;
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Configuration value as loaded from the configuration file.
pub type ConfigValue = toml::Value;

/// Key/value configuration, loaded once per process.
pub trait ConfigStore: Send + Sync {
    fn item(&self, key: &str) -> Option<ConfigValue>;

    /// Add or replace a value at runtime.
    fn set_item(&self, key: &str, value: ConfigValue);

    fn item_str(&self, key: &str) -> Option<String> {
        match self.item(key)? {
            ConfigValue::String(s) => Some(s),
            ConfigValue::Integer(i) => Some(i.to_string()),
            ConfigValue::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn item_i64(&self, key: &str) -> Option<i64> {
        match self.item(key)? {
            ConfigValue::Integer(i) => Some(i),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn item_bool(&self, key: &str) -> Option<bool> {
        match self.item(key)? {
            ConfigValue::Boolean(b) => Some(b),
            ConfigValue::Integer(i) => Some(i != 0),
            _ => None,
        }
    }
}

// =============================================================================
// HTTP RESPONDER
// =============================================================================

/// Sets the response status. A no-op when the process is not serving HTTP.
pub trait HttpResponder: Send + Sync {
    /// `text` overrides the configured reason phrase.
    fn set_status(&self, code: u16, text: Option<&str>);
}

// =============================================================================
// ERROR PRESENTER
// =============================================================================

/// Which page layout an abort renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorTemplate {
    General,
    NotFound,
}

impl ErrorTemplate {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::General => "error_general",
            Self::NotFound => "error_404",
        }
    }
}

/// Content of a deliberate error page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    pub heading: String,
    pub messages: Vec<String>,
    pub template: ErrorTemplate,
    pub status: u16,
}

/// Turns failures into user-facing text. Rendering only; the pipeline decides
/// when to render and where the result goes.
pub trait ErrorPresenter: Send + Sync {
    fn render_php_error(&self, record: &FailureRecord) -> String;

    fn render_exception(&self, fault: &Fault) -> String;

    fn render_error(&self, page: &ErrorPage) -> String;
}
