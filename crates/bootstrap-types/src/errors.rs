//! # Error Types
//!
//! `Halt` is the only way a failure leaves the bootstrap core: every variant
//! maps to a fixed process exit code, and the top-level dispatcher is the
//! single place that turns it into an actual exit.

use crate::entities::{AbortStatus, ExitCode, SourceLocation};
use thiserror::Error;

/// A decision to terminate the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Halt {
    /// A fatal runtime error was handled (or recovered at shutdown).
    #[error("Fatal error: {message}")]
    Fatal { message: String },

    /// Request code returned an error nobody handled.
    #[error("Uncaught exception: {message}")]
    UncaughtException { message: String },

    /// The configuration file is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The application environment name is not one the framework knows.
    #[error("The application environment is not set correctly: {environment}")]
    Environment { environment: String },

    /// No implementation exists for a requested component.
    #[error("Unable to locate the specified class: {name}")]
    UnknownComponent { name: String },

    /// An implementation exists but could not be constructed, or does not
    /// provide the capability the caller asked for.
    #[error("Unable to load the specified class {name}: {reason}")]
    ComponentLoad { name: String, reason: String },

    /// Deliberate 404 abort.
    #[error("Page not found: {page}")]
    NotFound { page: String },

    /// Deliberate abort through `show_error`.
    #[error("Request aborted ({}): {message}", .status.http_status)]
    Aborted { message: String, status: AbortStatus },
}

impl Halt {
    /// Fixed mapping from termination reason to process exit code.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Fatal { .. } | Self::UncaughtException { .. } | Self::Environment { .. } => {
                ExitCode::ERROR
            }
            Self::Config(_) => ExitCode::CONFIG,
            Self::NotFound { .. } => ExitCode::UNKNOWN_FILE,
            Self::UnknownComponent { .. } | Self::ComponentLoad { .. } => ExitCode::UNKNOWN_CLASS,
            Self::Aborted { status, .. } => status.exit_code,
        }
    }
}

/// Configuration loading failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Neither the main nor the environment configuration file exists.
    #[error("The configuration file does not exist.")]
    Missing { path: String },

    /// A configuration file exists but is not a key/value document.
    #[error("Your config file does not appear to be formatted correctly.")]
    Malformed { path: String, reason: String },

    /// A configuration file could not be read.
    #[error("Unable to read configuration file {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Failures while building a component instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// The constructor argument did not match what the component accepts.
    #[error("Invalid constructor argument: {0}")]
    InvalidArgument(String),

    /// An override asked for its base implementation but none was found.
    #[error("Base implementation of {0} is not available")]
    MissingBase(String),

    /// Any other constructor failure.
    #[error("{0}")]
    Failed(String),
}

/// A structured error that remembers where it was raised.
///
/// Request code can return it through `anyhow` to give the uncaught-exception
/// handler a type name and a source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Fault {
    pub kind: String,
    pub message: String,
    pub location: SourceLocation,
    /// Messages of the errors that led to this one, outermost first.
    pub causes: Vec<String>,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            location,
            causes: Vec::new(),
        }
    }

    /// Raise a fault at the caller's location.
    #[track_caller]
    pub fn raise(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, message, SourceLocation::caller())
    }

    #[must_use]
    pub fn with_causes<I, S>(mut self, causes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.causes = causes.into_iter().map(Into::into).collect();
        self
    }
}
