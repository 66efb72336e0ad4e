//! # Class Registry
//!
//! Lazily constructs named components and hands out the same instance for the
//! rest of the process.
//!
//! ## How It Works
//!
//! ```text
//! resolve("Log", "core")
//!        │
//!        ├── already built? ──────────────────────────────► same instance
//!        │
//!        ├── probe base:     application/core/Log
//!        │                   framework/core/Log          (first hit wins)
//!        │
//!        ├── probe override: application/core/MY_Log    (bound if present)
//!        │
//!        ├── none found ──► 503 + diagnostic ──► Halt::UnknownComponent (exit 5)
//!        │
//!        └── record in LoadTracker, construct, store ──► new instance
//! ```
//!
//! "Files" are entries of a [`Catalog`]: factories registered under a search
//! root, a category directory and a file name. The application registers its
//! own entries next to the framework's and can replace or extend any of them
//! without touching framework code.
//!
//! ## Invariants
//!
//! - A name maps to exactly one instance for the lifetime of the registry.
//! - The constructor argument of a repeat call is ignored.
//! - Resolution failures never reach the logger: the error pipeline itself
//!   resolves its components through this registry.

pub mod catalog;
pub mod registry;
pub mod tracker;

pub use catalog::{
    Catalog, Construction, Factory, Located, ResolutionPlan, SearchPath, SearchRoot, Services,
};
pub use registry::{ClassRegistry, CONFIG, EXCEPTIONS, LOG, OUTPUT};
pub use tracker::LoadTracker;
