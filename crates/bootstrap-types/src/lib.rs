//! # Bootstrap Types Crate
//!
//! Shared vocabulary of the request-bootstrap core: the severity model,
//! failure records, exit codes, the `Halt` termination value and the ports
//! that the registry and the escalation pipeline talk to.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: exit codes and severity masks are defined once,
//!   here, and every crate reads them from this module.
//! - **Termination is a value**: nothing below the top-level dispatcher calls
//!   `std::process::exit`; a failure that must end the process travels up as
//!   a [`Halt`].
//! - **Ports at the seams**: the host process, the logger, the configuration
//!   and the error presenter are traits so that each can be replaced by the
//!   application or by a recording double in tests.

pub mod component;
pub mod config;
pub mod entities;
pub mod errors;
pub mod ports;
pub mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use component::{Component, ComponentArg};
pub use config::ConfigTable;
pub use entities::*;
pub use errors::*;
pub use ports::*;
pub use status::{emit_status, HostResponder};
