//! # Escalation Pipeline
//!
//! Entry points for every failure that reaches the framework. Each one logs
//! through the registry's `Log` component, renders through `Exceptions` when
//! display is on, and returns a [`Halt`] when the process has to stop.

use crate::classify::{display_enabled, is_fatal, is_late_fatal, is_reported};
use bootstrap_types::{
    AbortStatus, ErrorPage, ErrorTemplate, FailureRecord, Fault, Halt, HostEnvironment, LogLevel,
    Severity, SourceLocation,
};
use class_registry::ClassRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Heading used by `show_error` when the caller gives none.
pub const DEFAULT_HEADING: &str = "An Error Was Encountered";

/// Status sent for fatal runtime errors.
const INTERNAL_SERVER_ERROR: u16 = 500;
const NOT_FOUND: u16 = 404;

/// Prefix that sets uncaught exceptions apart from runtime errors in the log.
const EXCEPTION_PREFIX: &str = "Exception: ";

/// Severity label used in the log line of an uncaught exception.
const EXCEPTION_SEVERITY: &str = "error";

pub struct EscalationPipeline {
    registry: Arc<ClassRegistry>,
}

impl EscalationPipeline {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    fn host(&self) -> &dyn HostEnvironment {
        self.registry.services().host.as_ref()
    }

    /// Runtime error handler.
    ///
    /// A fatal severity sets status 500 before anything else, even when the
    /// reporting mask then suppresses it. A suppressed error is neither logged
    /// nor rendered, and returns `Ok` even when fatal.
    ///
    /// # Errors
    ///
    /// [`Halt::Fatal`] once a reported fatal error has been handled, or the
    /// bootstrap-fatal halt of a component that could not be resolved.
    pub fn handle_error(
        &self,
        severity: Severity,
        message: &str,
        location: &SourceLocation,
    ) -> Result<(), Halt> {
        let fatal = is_fatal(severity);
        if fatal {
            self.registry.responder()?.set_status(INTERNAL_SERVER_ERROR, None);
        }

        let host = self.host();
        if !is_reported(severity, host.error_reporting()) {
            debug!("[Escalation] Suppressed {}: {}", severity, message);
            return Ok(());
        }

        let record = FailureRecord::runtime(severity, message, location.clone());
        self.log_failure(&severity.label(), &record.message, &record.location)?;

        if display_enabled(host.display_errors().as_deref()) {
            let presenter = self.registry.presenter()?;
            host.write_output(&presenter.render_php_error(&record));
        }

        if fatal {
            warn!("[Escalation] Fatal {} at {}: {}", severity, location, message);
            return Err(Halt::Fatal {
                message: message.to_string(),
            });
        }
        Ok(())
    }

    /// Raise a runtime error from the caller's location, normally with one
    /// of the `USER_*` severities.
    ///
    /// # Errors
    ///
    /// Same as [`EscalationPipeline::handle_error`].
    #[track_caller]
    pub fn trigger_error(&self, severity: Severity, message: &str) -> Result<(), Halt> {
        let location = SourceLocation::caller();
        self.handle_error(severity, message, &location)
    }

    /// Uncaught exception handler. Always logged, rendered when display is
    /// on, always terminal.
    pub fn handle_exception(&self, fault: &Fault) -> Halt {
        let message = format!("{EXCEPTION_PREFIX}{}", fault.message);
        if let Err(halt) = self.log_failure(EXCEPTION_SEVERITY, &message, &fault.location) {
            return halt;
        }

        let host = self.host();
        if display_enabled(host.display_errors().as_deref()) {
            match self.registry.presenter() {
                Ok(presenter) => host.write_output(&presenter.render_exception(fault)),
                Err(halt) => return halt,
            }
        }

        warn!("[Escalation] Uncaught {} at {}: {}", fault.kind, fault.location, fault.message);
        Halt::UncaughtException {
            message: fault.message.clone(),
        }
    }

    /// Shutdown handler: recover the host's last error when it is a late
    /// fatal. Does nothing when no error was recorded.
    ///
    /// # Errors
    ///
    /// Whatever [`EscalationPipeline::handle_error`] decides for the
    /// recovered error.
    pub fn handle_shutdown(&self) -> Result<(), Halt> {
        let Some(last) = self.host().last_error() else {
            return Ok(());
        };
        if !is_late_fatal(last.severity) {
            debug!("[Escalation] Ignoring last error {} at shutdown", last.severity);
            return Ok(());
        }

        warn!("[Escalation] Recovered {} at shutdown", last.severity);
        self.handle_error(last.severity, &last.message, &last.location)
    }

    /// Abort the request with an error page.
    ///
    /// `status_code` below 100 (after taking its absolute value) is an
    /// exit-code offset: the client sees 500 and the process exits with
    /// `status_code + 9`. Anything else is sent as the HTTP status and the
    /// process exits with 1.
    pub fn show_error(&self, message: &str, status_code: i64, heading: Option<&str>) -> Halt {
        let status = AbortStatus::from_status_code(status_code);
        let page = ErrorPage {
            heading: heading.unwrap_or(DEFAULT_HEADING).to_string(),
            messages: vec![message.to_string()],
            template: ErrorTemplate::General,
            status: status.http_status,
        };

        if let Err(halt) = self.render_page(&page) {
            return halt;
        }

        debug!(
            "[Escalation] show_error: status {} exit {}",
            status.http_status, status.exit_code
        );
        Halt::Aborted {
            message: message.to_string(),
            status,
        }
    }

    /// Abort the request with a not-found page, logging `<heading>: <page>`
    /// when `log_error` is set.
    pub fn show_404(&self, page: &str, log_error: bool) -> Halt {
        let (heading, message) = if self.host().is_cli() {
            ("Not Found", "The controller/method pair you requested was not found.")
        } else {
            ("404 Page Not Found", "The page you requested was not found.")
        };

        if log_error {
            match self.registry.logger() {
                Ok(logger) => {
                    logger.write_log(LogLevel::Error, &format!("{heading}: {page}"));
                }
                Err(halt) => return halt,
            }
        }

        let error_page = ErrorPage {
            heading: heading.to_string(),
            messages: vec![message.to_string()],
            template: ErrorTemplate::NotFound,
            status: NOT_FOUND,
        };
        if let Err(halt) = self.render_page(&error_page) {
            return halt;
        }

        Halt::NotFound {
            page: page.to_string(),
        }
    }

    fn render_page(&self, page: &ErrorPage) -> Result<(), Halt> {
        self.registry.responder()?.set_status(page.status, None);
        let presenter = self.registry.presenter()?;
        self.host().write_output(&presenter.render_error(page));
        Ok(())
    }

    fn log_failure(
        &self,
        severity: &str,
        message: &str,
        location: &SourceLocation,
    ) -> Result<(), Halt> {
        let logger = self.registry.logger()?;
        logger.write_log(
            LogLevel::Error,
            &format!(
                "Severity: {severity} --> {message} {} {}",
                location.file, location.line
            ),
        );
        Ok(())
    }
}
