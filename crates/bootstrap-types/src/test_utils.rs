//! Test utilities for the bootstrap core.
//!
//! Recording doubles for the host process and the logger. Enable with the
//! `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use bootstrap_types::test_utils::RecordingHost;
//! use bootstrap_types::HostEnvironment;
//!
//! let host = RecordingHost::http();
//! host.write_output("hello");
//! assert_eq!(host.output(), "hello");
//! ```

use crate::entities::{FailureRecord, Interface, Severity};
use crate::ports::{HostEnvironment, LogLevel, Logger};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct HostRecord {
    headers: Vec<(String, u16)>,
    output: String,
    display_errors: Option<String>,
    error_reporting: Severity,
    last_error: Option<FailureRecord>,
}

/// Host double that records headers and output.
///
/// Clones share the same record, so a test can keep one handle and give the
/// other to the code under test.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    interface: Interface,
    record: Arc<Mutex<HostRecord>>,
}

impl RecordingHost {
    /// Display on, every severity reported.
    pub fn new(interface: Interface) -> Self {
        let record = HostRecord {
            display_errors: Some("1".to_string()),
            error_reporting: Severity::ALL,
            ..HostRecord::default()
        };
        Self {
            interface,
            record: Arc::new(Mutex::new(record)),
        }
    }

    pub fn cli() -> Self {
        Self::new(Interface::Cli)
    }

    pub fn http() -> Self {
        Self::new(Interface::Server)
    }

    #[must_use]
    pub fn with_display_errors(self, value: Option<&str>) -> Self {
        self.record.lock().display_errors = value.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_error_reporting(self, mask: Severity) -> Self {
        self.record.lock().error_reporting = mask;
        self
    }

    pub fn set_last_error(&self, record: FailureRecord) {
        self.record.lock().last_error = Some(record);
    }

    pub fn headers(&self) -> Vec<(String, u16)> {
        self.record.lock().headers.clone()
    }

    /// Most recent status line.
    pub fn status_line(&self) -> Option<String> {
        self.record.lock().headers.last().map(|(line, _)| line.clone())
    }

    /// Most recent status code.
    pub fn status_code(&self) -> Option<u16> {
        self.record.lock().headers.last().map(|(_, code)| *code)
    }

    pub fn output(&self) -> String {
        self.record.lock().output.clone()
    }
}

impl HostEnvironment for RecordingHost {
    fn interface(&self) -> Interface {
        self.interface
    }

    fn send_header(&self, line: &str, code: u16) {
        self.record.lock().headers.push((line.to_string(), code));
    }

    fn write_output(&self, text: &str) {
        self.record.lock().output.push_str(text);
    }

    fn display_errors(&self) -> Option<String> {
        self.record.lock().display_errors.clone()
    }

    fn error_reporting(&self) -> Severity {
        self.record.lock().error_reporting
    }

    fn last_error(&self) -> Option<FailureRecord> {
        self.record.lock().last_error.clone()
    }
}

/// Logger double that keeps every message it receives.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Logger for RecordingLogger {
    fn write_log(&self, level: LogLevel, message: &str) -> bool {
        self.entries.lock().push((level, message.to_string()));
        true
    }
}
