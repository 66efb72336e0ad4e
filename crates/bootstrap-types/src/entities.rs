//! # Core Entities
//!
//! Value types shared by every crate of the bootstrap core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category directory holding the framework's own components.
pub const CORE: &str = "core";

/// Category directory holding general-purpose libraries (the default).
pub const LIBRARIES: &str = "libraries";

// =============================================================================
// SEVERITY
// =============================================================================

bitflags::bitflags! {
    /// Runtime error severity, a bitmask using the host runtime's numbering.
    ///
    /// A single reported error carries exactly one bit; masks (the reporting
    /// threshold, the fatal set) combine several.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Severity: u32 {
        const ERROR = 1 << 0;
        const WARNING = 1 << 1;
        const PARSE = 1 << 2;
        const NOTICE = 1 << 3;
        const CORE_ERROR = 1 << 4;
        const CORE_WARNING = 1 << 5;
        const COMPILE_ERROR = 1 << 6;
        const COMPILE_WARNING = 1 << 7;
        const USER_ERROR = 1 << 8;
        const USER_WARNING = 1 << 9;
        const USER_NOTICE = 1 << 10;
        const STRICT = 1 << 11;
        const RECOVERABLE_ERROR = 1 << 12;
        const DEPRECATED = 1 << 13;
        const USER_DEPRECATED = 1 << 14;
        const ALL = (1 << 15) - 1;
    }
}

impl Severity {
    pub const NONE: Self = Self::empty();

    /// Severities after which execution cannot continue.
    pub const FATAL: Self = Self::ERROR
        .union(Self::COMPILE_ERROR)
        .union(Self::CORE_ERROR)
        .union(Self::USER_ERROR);

    /// Severities that can only be observed once the process is shutting down.
    pub const LATE_FATAL: Self = Self::ERROR
        .union(Self::PARSE)
        .union(Self::CORE_ERROR)
        .union(Self::CORE_WARNING)
        .union(Self::COMPILE_ERROR)
        .union(Self::COMPILE_WARNING);

    /// Reporting mask used outside development: everything except notices,
    /// deprecations and strict-mode hints.
    pub const PRODUCTION: Self = Self::ALL.difference(
        Self::NOTICE
            .union(Self::DEPRECATED)
            .union(Self::STRICT)
            .union(Self::USER_NOTICE)
            .union(Self::USER_DEPRECATED),
    );

    const LABELS: [(Severity, &'static str); 12] = [
        (Self::ERROR, "Error"),
        (Self::WARNING, "Warning"),
        (Self::PARSE, "Parsing Error"),
        (Self::NOTICE, "Notice"),
        (Self::CORE_ERROR, "Core Error"),
        (Self::CORE_WARNING, "Core Warning"),
        (Self::COMPILE_ERROR, "Compile Error"),
        (Self::COMPILE_WARNING, "Compile Warning"),
        (Self::USER_ERROR, "User Error"),
        (Self::USER_WARNING, "User Warning"),
        (Self::USER_NOTICE, "User Notice"),
        (Self::STRICT, "Runtime Notice"),
    ];

    /// Human-readable label used in log lines and error pages.
    ///
    /// Severities without a label (masks, unknown bits) render as their number.
    #[must_use]
    pub fn label(self) -> String {
        Self::LABELS
            .iter()
            .find(|(severity, _)| *severity == self)
            .map_or_else(|| self.bits().to_string(), |(_, label)| (*label).to_string())
    }

    /// One operand of a mask expression: a decimal mask or an `E_` constant
    /// name, optionally complemented with `~`.
    fn parse_operand(operand: &str) -> Option<Self> {
        let operand = operand.trim();
        if let Some(rest) = operand.strip_prefix('~') {
            return Self::parse_operand(rest).map(|value| !value);
        }
        if let Ok(bits) = operand.parse::<u32>() {
            return Some(Self::from_bits_truncate(bits));
        }
        let name = operand.to_ascii_uppercase();
        Self::from_name(name.strip_prefix("E_")?)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Error returned when a reporting mask cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown severity expression: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Accepts a decimal mask (`"32767"`) or an expression over the `E_*`
    /// names: `~` complements, `&` intersects and binds tighter than `|`,
    /// which unites (`"E_ALL & ~E_NOTICE | E_USER_NOTICE"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSeverityError(s.to_string());
        if s.trim().is_empty() {
            return Err(invalid());
        }

        s.split('|').try_fold(Self::empty(), |union, term| {
            let intersection = term.split('&').try_fold(Self::ALL, |acc, operand| {
                Self::parse_operand(operand).map(|value| acc & value)
            });
            intersection.map(|value| union | value).ok_or_else(invalid)
        })
    }
}

// =============================================================================
// FAILURES
// =============================================================================

/// Where a failure was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the code that called the function this is used in.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), location.line())
    }

    /// Placeholder for failures that carry no location.
    pub fn unknown() -> Self {
        Self::new("unknown", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// How a failure is treated by the escalation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureClass {
    /// Execution cannot continue.
    Fatal,
    /// Warnings and notices; execution continues.
    Recoverable,
    /// An error nobody handled reached the top of the request.
    UncaughtException,
    /// Only observable at shutdown.
    LateFatal,
}

/// A failure as produced at the point where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub class: FailureClass,
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

impl FailureRecord {
    /// Record for an error reported while the request is running.
    pub fn runtime(severity: Severity, message: impl Into<String>, location: SourceLocation) -> Self {
        let class = if Severity::FATAL.contains(severity) {
            FailureClass::Fatal
        } else {
            FailureClass::Recoverable
        };
        Self {
            class,
            severity,
            message: message.into(),
            location,
        }
    }

    /// Record for an error the host noticed but could not report synchronously.
    pub fn late(severity: Severity, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            class: FailureClass::LateFatal,
            severity,
            message: message.into(),
            location,
        }
    }
}

// =============================================================================
// EXIT CODES
// =============================================================================

/// Process termination code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExitCode(u8);

impl ExitCode {
    pub const SUCCESS: Self = Self(0);
    /// Generic error.
    pub const ERROR: Self = Self(1);
    /// Configuration error.
    pub const CONFIG: Self = Self(3);
    /// File not found.
    pub const UNKNOWN_FILE: Self = Self(4);
    /// Unknown class.
    pub const UNKNOWN_CLASS: Self = Self(5);
    /// Unknown class member.
    pub const UNKNOWN_METHOD: Self = Self(6);
    /// Invalid user input.
    pub const USER_INPUT: Self = Self(7);
    /// Database error.
    pub const DATABASE: Self = Self(8);
    /// Lowest automatically derived code.
    pub const AUTO_MIN: Self = Self(9);
    /// Highest automatically derived code.
    pub const AUTO_MAX: Self = Self(125);

    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Derive a code from a small caller-supplied offset: `offset + 9`,
    /// collapsing to [`ExitCode::ERROR`] past [`ExitCode::AUTO_MAX`].
    #[must_use]
    pub fn derived(offset: u32) -> Self {
        let derived = offset.saturating_add(u32::from(Self::AUTO_MIN.0));
        if derived > u32::from(Self::AUTO_MAX.0) {
            Self::ERROR
        } else {
            // derived <= 125 here
            Self(derived as u8)
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        i32::from(code.0)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two meanings of the caller-facing `status_code` of a deliberate abort,
/// separated once at the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortStatus {
    pub http_status: u16,
    pub exit_code: ExitCode,
}

impl AbortStatus {
    pub const INTERNAL_SERVER_ERROR: u16 = 500;

    /// Values below 100 are an exit-code shorthand: the process exits with a
    /// derived code and the client sees 500. Anything else is an HTTP status
    /// passed through verbatim, with the generic exit code. A status that
    /// does not fit a `u16` is clamped to `u16::MAX`.
    #[must_use]
    pub fn from_status_code(status_code: i64) -> Self {
        let status_code = status_code.unsigned_abs();
        if status_code < 100 {
            // < 100 fits in u32
            Self {
                http_status: Self::INTERNAL_SERVER_ERROR,
                exit_code: ExitCode::derived(status_code as u32),
            }
        } else {
            Self {
                http_status: u16::try_from(status_code).unwrap_or(u16::MAX),
                exit_code: ExitCode::ERROR,
            }
        }
    }
}

// =============================================================================
// HOST INTERFACE
// =============================================================================

/// How the process was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interface {
    /// Command line; status lines are never sent.
    Cli,
    /// CGI / FastCGI; status goes out as a `Status:` header.
    Cgi,
    /// Embedded server; status goes out as a protocol status line.
    Server,
}

impl Interface {
    #[must_use]
    pub fn is_cli(self) -> bool {
        self == Self::Cli
    }
}

impl FromStr for Interface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "cli" => Ok(Self::Cli),
            _ if lower.starts_with("cgi") || lower.ends_with("fcgi") => Ok(Self::Cgi),
            "server" | "apache" | "embed" => Ok(Self::Server),
            _ => Err(format!("Unknown interface: {s}")),
        }
    }
}
