//! # Bootstrap Runtime
//!
//! Process-level wiring of the request-bootstrap core.
//!
//! ## Modules
//!
//! - `container/` - runtime settings read from the environment
//! - `adapters/` - process host, configuration files and the framework logger
//! - `components/` - the framework catalog and its libraries
//! - `kernel` - boot, request handling and the exit code
//!
//! ## Startup Sequence
//!
//! 1. Read [`RuntimeSettings`] from the environment
//! 2. Validate the environment name
//! 3. Load `config.toml` and the environment overlay
//! 4. Build the catalog (framework entries, then application entries)
//! 5. Create the registry and the escalation pipeline
//! 6. Run the request, then the shutdown handler
//! 7. Flush the response and exit with the code of the first halt

pub mod adapters;
pub mod components;
pub mod container;
pub mod kernel;

pub use adapters::{LogThreshold, ProcessHost, TomlConfigLoader, TracingLogger};
pub use components::{framework_catalog, Benchmark, BenchmarkOptions};
pub use container::{Environment, RuntimeSettings, SettingsError};
pub use kernel::{exit_code, Kernel, RequestContext};
