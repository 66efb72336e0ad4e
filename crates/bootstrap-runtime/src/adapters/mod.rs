//! # Adapters
//!
//! Port implementations backed by the real process: the host, the
//! configuration files and the log sink.

pub mod config_file;
pub mod host;
pub mod logger;

pub use config_file::TomlConfigLoader;
pub use host::ProcessHost;
pub use logger::{LogThreshold, TracingLogger};
