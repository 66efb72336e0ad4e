//! # Runtime Container
//!
//! Settings the process starts from. Everything else is built from them by
//! the [`Kernel`](crate::kernel::Kernel).

pub mod config;

pub use config::{Environment, RuntimeSettings, SettingsError};
