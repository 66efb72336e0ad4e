//! # Escalation Pipeline
//!
//! Decides, for every failure that reaches the framework, whether it is
//! logged, whether it is shown, and which exit code ends the process.
//!
//! ## Failure Paths
//!
//! ```text
//! runtime error ──► fatal? ──yes──► status 500
//!                     │
//!                     ▼
//!                 reported? ──no──► return (suppressed)
//!                     │
//!                     ▼
//!                   log ──► display on? ──► render
//!                     │
//!                     ▼
//!                  fatal? ──yes──► Halt::Fatal (exit 1)
//!
//! uncaught exception ──► log ──► display on? ──► render ──► Halt (exit 1)
//! shutdown ──► last error late-fatal? ──► runtime error path
//! show_error ──► status ──► render ──► Halt (exit 1 or status_code + 9)
//! show_404   ──► log? ──► status 404 ──► render ──► Halt (exit 4)
//! ```
//!
//! Nothing here ends the process. Terminal paths return a [`Halt`] and the
//! caller's dispatcher performs the exit.
//!
//! [`Halt`]: bootstrap_types::Halt

pub mod classify;
pub mod pipeline;
pub mod presenter;

pub use classify::{display_enabled, is_fatal, is_late_fatal, is_reported};
pub use pipeline::{EscalationPipeline, DEFAULT_HEADING};
pub use presenter::DefaultErrorPresenter;

use bootstrap_types::{Component, HostResponder, CORE};
use class_registry::{Catalog, SearchRoot, CONFIG, EXCEPTIONS, OUTPUT};
use std::sync::Arc;

/// Register the framework's `Config`, `Output` and `Exceptions` components.
///
/// The logger is left to the caller, which knows where log files go.
pub fn provide_core(catalog: &mut Catalog) {
    catalog
        .provide(SearchRoot::Framework, CORE, CONFIG, |c| {
            Ok(Component::Config(c.config()))
        })
        .provide(SearchRoot::Framework, CORE, OUTPUT, |c| {
            Ok(Component::Responder(Arc::new(HostResponder::new(
                c.host(),
                c.config(),
            ))))
        })
        .provide(SearchRoot::Framework, CORE, EXCEPTIONS, |c| {
            Ok(Component::Presenter(Arc::new(DefaultErrorPresenter::new(
                c.host().interface(),
            ))))
        });
}
