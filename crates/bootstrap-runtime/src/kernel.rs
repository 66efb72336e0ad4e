//! # Kernel
//!
//! Boots the framework for one process and runs one request through it.
//!
//! ## Lifecycle
//!
//! ```text
//! boot:    validate environment ──► load config ──► build catalog ──► registry + pipeline
//!              │ 503, exit 1          │ 503, exit 3
//!              ▼                      ▼
//!            Halt                   Halt
//!
//! handle:  request(ctx) ──► Ok ─────────────┐
//!              │ Err(Halt) ──► as is        │
//!              │ Err(other) ──► exception   ├──► shutdown handler ──► first Halt wins
//!              │ panic ──► late ERROR       │
//!              └────────────────────────────┘
//! ```
//!
//! The binary is the only caller of `std::process::exit`, with the code
//! from [`exit_code`].

use crate::adapters::{ProcessHost, TomlConfigLoader};
use crate::components::framework_catalog;
use crate::container::{Environment, RuntimeSettings};
use anyhow::Context as _;
use bootstrap_types::{
    emit_status, Component, ComponentArg, ConfigStore, ConfigTable, ExitCode, Fault, Halt,
    HostEnvironment, LogLevel, Severity, SourceLocation, LIBRARIES,
};
use class_registry::{Catalog, ClassRegistry, Services};
use escalation_pipeline::EscalationPipeline;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SERVICE_UNAVAILABLE: u16 = 503;

/// Message shown when the environment name is not recognized.
pub const INVALID_ENVIRONMENT: &str = "The application environment is not set correctly.";

/// Kind given to request errors that are not a [`Fault`].
const GENERIC_FAULT_KIND: &str = "Error";

pub struct Kernel {
    environment: Environment,
    host: Arc<ProcessHost>,
    registry: Arc<ClassRegistry>,
    pipeline: EscalationPipeline,
}

impl Kernel {
    /// Boot for `settings`, letting `register_app` add the application's
    /// own catalog entries next to the framework's.
    ///
    /// # Errors
    ///
    /// - [`Halt::Environment`] for an unknown environment name.
    /// - [`Halt::Config`] when the configuration is missing or malformed.
    ///
    /// Both have already sent 503 and written their message to `host`.
    pub fn boot<F>(
        settings: &RuntimeSettings,
        host: Arc<ProcessHost>,
        register_app: F,
    ) -> Result<Self, Halt>
    where
        F: FnOnce(&mut Catalog),
    {
        let environment = match settings.environment() {
            Ok(environment) => environment,
            Err(halt) => {
                warn!("[Kernel] Unknown environment {:?}", settings.environment);
                Self::early_fatal(&host, INVALID_ENVIRONMENT);
                return Err(halt);
            }
        };

        let config = match TomlConfigLoader::new(&settings.app_path).load(environment.as_str()) {
            Ok(config) => Arc::new(config),
            Err(e) => {
                warn!("[Kernel] Configuration failed: {:?}", e);
                Self::early_fatal(&host, &e.to_string());
                return Err(Halt::Config(e));
            }
        };

        let mut catalog = framework_catalog(settings.app_path.clone());
        register_app(&mut catalog);

        let host_port: Arc<dyn HostEnvironment> = host.clone();
        let config_port: Arc<dyn ConfigStore> = config;
        let registry = Arc::new(ClassRegistry::from_config(
            catalog,
            Services::new(host_port, config_port),
        ));
        let pipeline = EscalationPipeline::new(Arc::clone(&registry));

        info!(
            "[Kernel] Booted {} ({:?} interface)",
            environment,
            host.interface()
        );
        Ok(Self {
            environment,
            host,
            registry,
            pipeline,
        })
    }

    /// Failures before the registry exists: no configured phrases, no logger.
    fn early_fatal(host: &ProcessHost, message: &str) {
        emit_status(
            host,
            &ConfigTable::default(),
            SERVICE_UNAVAILABLE,
            Some("Service Unavailable"),
        );
        host.write_output(message);
    }

    /// Route panics into the host's last error so the shutdown handler
    /// reports them. Replaces the process-wide panic hook.
    pub fn install_panic_hook(&self) {
        let host = Arc::clone(&self.host);
        panic::set_hook(Box::new(move |info| host.record_panic(info)));
    }

    /// Run one request, then the shutdown handler.
    ///
    /// # Errors
    ///
    /// The first [`Halt`] produced by the request, its error handling or the
    /// shutdown handler.
    pub fn handle<F>(&self, request: F) -> Result<(), Halt>
    where
        F: FnOnce(&RequestContext<'_>) -> anyhow::Result<()>,
    {
        let context = RequestContext { kernel: self };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| request(&context)));

        let halt = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(self.escalate(&error)),
            Err(payload) => {
                self.host.record_panic_payload(&*payload);
                None
            }
        };

        let shutdown = self.pipeline.handle_shutdown().err();
        match halt.or(shutdown) {
            Some(halt) => {
                info!("[Kernel] Request halted: {} (exit {})", halt, halt.exit_code());
                Err(halt)
            }
            None => {
                debug!("[Kernel] Request completed");
                Ok(())
            }
        }
    }

    fn escalate(&self, error: &anyhow::Error) -> Halt {
        if let Some(halt) = error.downcast_ref::<Halt>() {
            return halt.clone();
        }
        self.pipeline.handle_exception(&fault_from(error))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn host(&self) -> &Arc<ProcessHost> {
        &self.host
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    pub fn pipeline(&self) -> &EscalationPipeline {
        &self.pipeline
    }
}

/// Process exit code for the outcome of boot or of a request.
#[must_use]
pub fn exit_code(outcome: &Result<(), Halt>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(halt) => halt.exit_code(),
    }
}

/// Turn a request error into the structured form the exception handler
/// renders. A [`Fault`] anywhere in the chain supplies kind and location.
fn fault_from(error: &anyhow::Error) -> Fault {
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    match error.chain().find_map(|e| e.downcast_ref::<Fault>()) {
        Some(fault) => {
            let causes = if causes.is_empty() {
                fault.causes.clone()
            } else {
                causes
            };
            Fault {
                message: error.to_string(),
                causes,
                ..fault.clone()
            }
        }
        None => Fault::new(GENERIC_FAULT_KIND, error.to_string(), SourceLocation::unknown())
            .with_causes(causes),
    }
}

/// What request code sees of the framework.
pub struct RequestContext<'k> {
    kernel: &'k Kernel,
}

impl RequestContext<'_> {
    pub fn registry(&self) -> &ClassRegistry {
        &self.kernel.registry
    }

    pub fn environment(&self) -> Environment {
        self.kernel.environment
    }

    pub fn is_cli(&self) -> bool {
        self.kernel.host.is_cli()
    }

    /// Resolve a library.
    ///
    /// # Errors
    ///
    /// The bootstrap-fatal [`Halt`] of an unknown or unbuildable component.
    pub fn resolve(&self, name: &str) -> Result<Component, Halt> {
        self.kernel.registry.resolve(name)
    }

    /// Resolve a library as its concrete type, building it with `arg` on
    /// first use.
    ///
    /// # Errors
    ///
    /// A resolution [`Halt`], or an error when the library is not a `T`.
    pub fn library<T>(&self, name: &str, arg: Option<ComponentArg>) -> anyhow::Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let component = self.kernel.registry.resolve_in(name, LIBRARIES, arg)?;
        component
            .downcast_library::<T>()
            .with_context(|| format!("{name} is not a {}", std::any::type_name::<T>()))
    }

    /// Configuration item through the `Config` component.
    ///
    /// # Errors
    ///
    /// The bootstrap-fatal [`Halt`] when `Config` cannot be resolved.
    pub fn config_item(&self, key: &str) -> Result<Option<bootstrap_types::ConfigValue>, Halt> {
        Ok(self.kernel.registry.config()?.item(key))
    }

    /// Send a message to the framework log.
    ///
    /// # Errors
    ///
    /// The bootstrap-fatal [`Halt`] when `Log` cannot be resolved.
    pub fn log_message(&self, level: LogLevel, message: &str) -> Result<bool, Halt> {
        Ok(self.kernel.registry.logger()?.write_log(level, message))
    }

    /// Append to the response body.
    pub fn output(&self, text: &str) {
        self.kernel.host.write_output(text);
    }

    /// Raise a runtime error at the caller's location.
    ///
    /// # Errors
    ///
    /// [`Halt::Fatal`] for a reported fatal severity.
    #[track_caller]
    pub fn trigger_error(&self, severity: Severity, message: &str) -> Result<(), Halt> {
        self.kernel.pipeline.trigger_error(severity, message)
    }

    /// See [`EscalationPipeline::show_error`]. Return the result as the
    /// request's error.
    pub fn show_error(&self, message: &str, status_code: i64, heading: Option<&str>) -> Halt {
        self.kernel.pipeline.show_error(message, status_code, heading)
    }

    /// See [`EscalationPipeline::show_404`]. Return the result as the
    /// request's error.
    pub fn show_404(&self, page: &str, log_error: bool) -> Halt {
        self.kernel.pipeline.show_404(page, log_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Benchmark;
    use bootstrap_types::Interface;
    use std::fs;
    use tempfile::TempDir;

    fn app(config: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/config.toml"), config).unwrap();
        dir
    }

    fn settings(dir: &TempDir, interface: Interface) -> RuntimeSettings {
        RuntimeSettings {
            app_path: dir.path().to_path_buf(),
            interface,
            ..RuntimeSettings::default()
        }
    }

    fn boot(settings: &RuntimeSettings) -> (Arc<ProcessHost>, Result<Kernel, Halt>) {
        let host = Arc::new(ProcessHost::from_settings(settings));
        let kernel = Kernel::boot(settings, Arc::clone(&host), |_| {});
        (host, kernel)
    }

    #[test]
    fn test_invalid_environment() {
        let dir = app("");
        let mut settings = settings(&dir, Interface::Server);
        settings.environment = "staging".into();

        let (host, kernel) = boot(&settings);
        let outcome = kernel.map(|_| ());

        assert_eq!(exit_code(&outcome).code(), 1);
        assert_eq!(host.body(), INVALID_ENVIRONMENT);
        assert_eq!(
            host.status_line().as_deref(),
            Some("HTTP/1.1 503 Service Unavailable")
        );
    }

    #[test]
    fn test_missing_configuration_exits_3() {
        let dir = TempDir::new().unwrap();
        let (host, kernel) = boot(&settings(&dir, Interface::Cli));

        let outcome = kernel.map(|_| ());
        assert_eq!(exit_code(&outcome).code(), 3);
        assert_eq!(host.body(), "The configuration file does not exist.");
        assert!(host.status_line().is_none());
    }

    #[test]
    fn test_successful_request() {
        let dir = app("log_threshold = 0");
        let (host, kernel) = boot(&settings(&dir, Interface::Cli));
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            let benchmark = ctx.library::<Benchmark>("Benchmark", None)?;
            benchmark.mark("start");
            ctx.output("ok");
            Ok(())
        });

        assert_eq!(exit_code(&outcome), ExitCode::SUCCESS);
        assert_eq!(host.body(), "ok");
        assert!(kernel.registry().tracker().is_loaded("benchmark"));
    }

    #[test]
    fn test_config_items_are_shared() {
        let dir = app("subclass_prefix = \"MY_\"");
        let (_host, kernel) = boot(&settings(&dir, Interface::Cli));
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.registry()
                .config()?
                .set_item("base_url", "https://example.test/".into());
            let value = ctx.config_item("base_url")?;
            assert_eq!(
                value.as_ref().and_then(|v| v.as_str()),
                Some("https://example.test/")
            );
            assert!(ctx.config_item("missing")?.is_none());
            Ok(())
        });
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_returned_halt_is_kept() {
        let dir = app("");
        let (_host, kernel) = boot(&settings(&dir, Interface::Server));
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| Err(ctx.show_404("/nope", false).into()));
        assert_eq!(exit_code(&outcome).code(), 4);
    }

    #[test]
    fn test_plain_error_is_uncaught_exception() {
        let dir = app("");
        let (host, kernel) = boot(&settings(&dir, Interface::Cli));
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|_| {
            Err(anyhow::anyhow!("socket closed")).context("loading profile")
        });

        assert_eq!(exit_code(&outcome).code(), 1);
        assert!(host.body().contains("loading profile"));
        assert!(host.body().contains("socket closed"));
    }

    #[test]
    fn test_fault_keeps_its_location() {
        let fault = Fault::new("DomainError", "bad input", SourceLocation::new("Form.php", 4));
        let error = anyhow::Error::new(fault).context("saving form");

        let converted = fault_from(&error);
        assert_eq!(converted.kind, "DomainError");
        assert_eq!(converted.location.line, 4);
        assert_eq!(converted.message, "saving form");
        assert_eq!(converted.causes, vec!["bad input".to_string()]);
    }

    #[test]
    fn test_panic_recovered_at_shutdown() {
        let dir = app("");
        let (host, kernel) = boot(&settings(&dir, Interface::Server));
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|_| panic!("index out of bounds"));

        assert_eq!(exit_code(&outcome).code(), 1);
        assert!(host.status_line().unwrap().contains("500"));
        assert!(host.body().contains("index out of bounds"));
    }

    #[test]
    fn test_unknown_library_exits_5() {
        let dir = app("");
        let (host, kernel) = boot(&settings(&dir, Interface::Cli));
        let kernel = kernel.unwrap();

        let outcome = kernel.handle(|ctx| {
            ctx.resolve("DoesNotExist")?;
            Ok(())
        });

        assert_eq!(exit_code(&outcome).code(), 5);
        assert_eq!(
            host.body(),
            "Unable to locate the specified class: DoesNotExist.php"
        );
    }
}
