//! # Status Line
//!
//! Formatting and emission of the HTTP status line. Shared by the framework's
//! `Output` component and by the registry's bootstrap-fatal path, which must
//! not go through the registry to set its 503.

use crate::entities::Interface;
use crate::ports::{ConfigStore, ConfigValue, HostEnvironment, HttpResponder};
use std::sync::Arc;
use tracing::debug;

/// Configuration key holding the `code -> reason phrase` table.
pub const STATUS_TEXTS_KEY: &str = "status_texts";

/// Reason phrase configured for `code`, if any.
pub fn reason_phrase(config: &dyn ConfigStore, code: u16) -> Option<String> {
    match config.item(STATUS_TEXTS_KEY)? {
        ConfigValue::Table(table) => match table.get(&code.to_string())? {
            ConfigValue::String(text) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Send a status line for `code` through the host. Does nothing under CLI.
///
/// Without an explicit `text` the configured reason phrase is used; a code
/// with no phrase goes out bare.
pub fn emit_status(
    host: &dyn HostEnvironment,
    config: &dyn ConfigStore,
    code: u16,
    text: Option<&str>,
) {
    let interface = host.interface();
    if interface.is_cli() {
        return;
    }

    let text = match text {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        _ => reason_phrase(config, code),
    };

    let status = match text {
        Some(text) => format!("{code} {text}"),
        None => code.to_string(),
    };

    let line = match interface {
        Interface::Cgi => format!("Status: {status}"),
        _ => format!("{} {status}", host.server_protocol()),
    };

    debug!("[Status] {}", line);
    host.send_header(&line, code);
}

/// The framework's `Output` component: status lines through the host.
pub struct HostResponder {
    host: Arc<dyn HostEnvironment>,
    config: Arc<dyn ConfigStore>,
}

impl HostResponder {
    pub fn new(host: Arc<dyn HostEnvironment>, config: Arc<dyn ConfigStore>) -> Self {
        Self { host, config }
    }
}

impl HttpResponder for HostResponder {
    fn set_status(&self, code: u16, text: Option<&str>) {
        emit_status(self.host.as_ref(), self.config.as_ref(), code, text);
    }
}
