//! # Framework Catalog
//!
//! Every component the framework ships, registered under the framework
//! search root:
//!
//! | Directory | Name | Component |
//! |---|---|---|
//! | `core` | `Config` | loaded configuration |
//! | `core` | `Output` | status lines through the host |
//! | `core` | `Exceptions` | `DefaultErrorPresenter` |
//! | `core` | `Log` | `TracingLogger` |
//! | `libraries` | `Benchmark` | `Benchmark` |
//!
//! Applications add their own entries (or `MY_`-prefixed overrides) under
//! the application root.

pub mod benchmark;

pub use benchmark::{Benchmark, BenchmarkOptions};

use crate::adapters::TracingLogger;
use bootstrap_types::{Component, CORE, LIBRARIES};
use class_registry::{Catalog, SearchRoot, LOG};
use std::path::PathBuf;
use std::sync::Arc;

pub const BENCHMARK: &str = "Benchmark";

/// The framework's catalog for an application rooted at `app_path`.
pub fn framework_catalog(app_path: impl Into<PathBuf>) -> Catalog {
    let app_path = app_path.into();
    let mut catalog = Catalog::new();
    escalation_pipeline::provide_core(&mut catalog);

    catalog
        .provide(SearchRoot::Framework, CORE, LOG, move |c| {
            let config = c.config();
            Ok(Component::Logger(Arc::new(TracingLogger::from_config(
                config.as_ref(),
                &app_path,
            ))))
        })
        .provide(SearchRoot::Framework, LIBRARIES, BENCHMARK, |c| {
            Ok(Component::library(Benchmark::new(c.options()?)))
        });
    catalog
}
