//! # Request Bootstrap Test Suite
//!
//! Cross-crate flows that boot the runtime against a temporary application
//! directory and check what the client, the log and the exit code see.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── request_lifecycle.rs   # boot, request, shutdown, exit codes
//!     └── override_flows.rs      # application components and MY_ overrides
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bootstrap-tests
//! cargo test -p bootstrap-tests integration::override_flows::
//! ```

pub mod integration;
