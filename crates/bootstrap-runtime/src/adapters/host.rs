//! # Process Host
//!
//! [`HostEnvironment`] for the running process. The status line and the body
//! are buffered until [`ProcessHost::finish`], so a late 500 still replaces
//! an earlier status. Panics are captured as the host's last error for the
//! shutdown handler to recover.

use crate::container::RuntimeSettings;
use bootstrap_types::{FailureRecord, HostEnvironment, Interface, Severity, SourceLocation};
use parking_lot::Mutex;
use std::any::Any;
use std::io::{self, Write};
use std::panic::PanicHookInfo;

#[derive(Debug, Default)]
struct Response {
    status: Option<String>,
    body: String,
    last_error: Option<FailureRecord>,
}

#[derive(Debug)]
pub struct ProcessHost {
    interface: Interface,
    server_protocol: String,
    display_errors: Option<String>,
    error_reporting: Severity,
    response: Mutex<Response>,
}

impl ProcessHost {
    pub fn new(
        interface: Interface,
        server_protocol: impl Into<String>,
        display_errors: Option<String>,
        error_reporting: Severity,
    ) -> Self {
        Self {
            interface,
            server_protocol: server_protocol.into(),
            display_errors,
            error_reporting,
            response: Mutex::new(Response::default()),
        }
    }

    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        Self::new(
            settings.interface,
            settings.server_protocol.clone(),
            Some(settings.effective_display_errors()),
            settings.effective_error_reporting(),
        )
    }

    /// Record a failure the process could not report where it happened.
    pub fn record_last_error(&self, record: FailureRecord) {
        self.response.lock().last_error = Some(record);
    }

    /// Panic hook body: the panic becomes a late `ERROR` at its location.
    pub fn record_panic(&self, info: &PanicHookInfo<'_>) {
        let location = info
            .location()
            .map_or_else(SourceLocation::unknown, |l| {
                SourceLocation::new(l.file(), l.line())
            });
        self.record_last_error(FailureRecord::late(
            Severity::ERROR,
            panic_message(info.payload()),
            location,
        ));
    }

    /// Record a panic caught without the hook, when nothing else was
    /// recorded for it.
    pub fn record_panic_payload(&self, payload: &(dyn Any + Send)) {
        let mut response = self.response.lock();
        if response.last_error.is_none() {
            response.last_error = Some(FailureRecord::late(
                Severity::ERROR,
                panic_message(payload),
                SourceLocation::unknown(),
            ));
        }
    }

    /// Current status line, if one was sent.
    pub fn status_line(&self) -> Option<String> {
        self.response.lock().status.clone()
    }

    pub fn body(&self) -> String {
        self.response.lock().body.clone()
    }

    /// Write the buffered response. Under CLI only the body is written.
    ///
    /// # Errors
    ///
    /// Any error from `out`.
    pub fn finish(&self, out: &mut dyn Write) -> io::Result<()> {
        let response = self.response.lock();
        if !self.interface.is_cli() {
            if let Some(status) = &response.status {
                write!(out, "{status}\r\n")?;
            }
            write!(out, "Content-Type: text/html; charset=UTF-8\r\n\r\n")?;
        }
        out.write_all(response.body.as_bytes())?;
        out.flush()
    }
}

impl HostEnvironment for ProcessHost {
    fn interface(&self) -> Interface {
        self.interface
    }

    fn server_protocol(&self) -> String {
        self.server_protocol.clone()
    }

    fn send_header(&self, line: &str, _code: u16) {
        self.response.lock().status = Some(line.to_string());
    }

    fn write_output(&self, text: &str) {
        self.response.lock().body.push_str(text);
    }

    fn display_errors(&self) -> Option<String> {
        self.display_errors.clone()
    }

    fn error_reporting(&self) -> Severity {
        self.error_reporting
    }

    fn last_error(&self) -> Option<FailureRecord> {
        self.response.lock().last_error.clone()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}
