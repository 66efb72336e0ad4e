//! # Class Registry
//!
//! One instance per component name for the lifetime of the registry. The
//! instance map lock is held from the first probe to the final insert, so
//! the first resolution of a name is the only one that ever constructs.

use crate::catalog::{Catalog, SearchPath, Services};
use crate::tracker::LoadTracker;
use bootstrap_types::{
    emit_status, Component, ComponentArg, ConfigStore, ErrorPresenter, Halt, HttpResponder, Logger,
    CORE, LIBRARIES,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Status sent when a component cannot be provided.
const SERVICE_UNAVAILABLE: u16 = 503;

/// Core component names the framework resolves for itself.
pub const LOG: &str = "Log";
pub const CONFIG: &str = "Config";
pub const OUTPUT: &str = "Output";
pub const EXCEPTIONS: &str = "Exceptions";

pub struct ClassRegistry {
    catalog: Catalog,
    search_path: SearchPath,
    services: Services,
    instances: Mutex<HashMap<String, Component>>,
    tracker: LoadTracker,
}

impl ClassRegistry {
    pub fn new(catalog: Catalog, search_path: SearchPath, services: Services) -> Self {
        info!(
            "[Registry] Initialized with {} catalog entries (subclass prefix {})",
            catalog.len(),
            search_path.subclass_prefix()
        );
        Self {
            catalog,
            search_path,
            services,
            instances: Mutex::new(HashMap::new()),
            tracker: LoadTracker::new(),
        }
    }

    /// Build a registry whose override prefix comes from the loaded
    /// configuration.
    pub fn from_config(catalog: Catalog, services: Services) -> Self {
        let search_path = SearchPath::from_config(services.config.as_ref());
        Self::new(catalog, search_path, services)
    }

    /// Resolve a library.
    pub fn resolve(&self, name: &str) -> Result<Component, Halt> {
        self.resolve_in(name, LIBRARIES, None)
    }

    /// Resolve `name` from the `directory` category.
    ///
    /// `arg` is handed to the constructor on first resolution only; later
    /// calls return the existing instance and ignore it.
    ///
    /// # Errors
    ///
    /// Bootstrap-fatal: the 503 status and a diagnostic are written straight
    /// to the host before returning, and the logger is never involved.
    /// - [`Halt::UnknownComponent`] when no implementation exists.
    /// - [`Halt::ComponentLoad`] when the implementation fails to build.
    pub fn resolve_in(
        &self,
        name: &str,
        directory: &str,
        arg: Option<ComponentArg>,
    ) -> Result<Component, Halt> {
        let mut instances = self.instances.lock();
        if let Some(existing) = instances.get(name) {
            return Ok(existing.clone());
        }

        let Some(plan) = self.catalog.plan(&self.search_path, directory, name) else {
            warn!("[Registry] No implementation of {} in {}", name, directory);
            self.bootstrap_fatal(&format!("Unable to locate the specified class: {name}.php"));
            return Err(Halt::UnknownComponent {
                name: name.to_string(),
            });
        };

        self.tracker.record(name);

        let component = plan
            .construct(name, &self.services, arg.as_ref())
            .map_err(|e| {
                let class_name = plan.identity().unwrap_or(name);
                warn!("[Registry] Failed to construct {}: {}", class_name, e);
                self.bootstrap_fatal(&format!(
                    "Unable to load the specified class: {class_name}.php"
                ));
                Halt::ComponentLoad {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            })?;

        debug!(
            "[Registry] Resolved {} as {} ({})",
            name,
            plan.identity().unwrap_or(name),
            component.capability()
        );
        instances.insert(name.to_string(), component.clone());
        Ok(component)
    }

    /// The framework logger.
    pub fn logger(&self) -> Result<Arc<dyn Logger>, Halt> {
        let component = self.resolve_in(LOG, CORE, None)?;
        self.capability(LOG, component.as_logger(), &component)
    }

    /// The configuration component.
    pub fn config(&self) -> Result<Arc<dyn ConfigStore>, Halt> {
        let component = self.resolve_in(CONFIG, CORE, None)?;
        self.capability(CONFIG, component.as_config(), &component)
    }

    /// The status-line component.
    pub fn responder(&self) -> Result<Arc<dyn HttpResponder>, Halt> {
        let component = self.resolve_in(OUTPUT, CORE, None)?;
        self.capability(OUTPUT, component.as_responder(), &component)
    }

    /// The error presentation component.
    pub fn presenter(&self) -> Result<Arc<dyn ErrorPresenter>, Halt> {
        let component = self.resolve_in(EXCEPTIONS, CORE, None)?;
        self.capability(EXCEPTIONS, component.as_presenter(), &component)
    }

    /// Whether `name` already has an instance.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.instances.lock().contains_key(name)
    }

    /// Existing instance of `name`, without resolving it.
    pub fn instance(&self, name: &str) -> Option<Component> {
        self.instances.lock().get(name).cloned()
    }

    pub fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    fn capability<T: ?Sized>(
        &self,
        name: &str,
        handle: Option<Arc<T>>,
        component: &Component,
    ) -> Result<Arc<T>, Halt> {
        handle.ok_or_else(|| {
            warn!(
                "[Registry] {} resolved to a {} component",
                name,
                component.capability()
            );
            self.bootstrap_fatal(&format!("Unable to load the specified class: {name}.php"));
            Halt::ComponentLoad {
                name: name.to_string(),
                reason: format!("provides {} instead", component.capability()),
            }
        })
    }

    /// Goes to the host directly: the logger and the responder may be the
    /// very components that failed.
    fn bootstrap_fatal(&self, diagnostic: &str) {
        let host = self.services.host.as_ref();
        emit_status(host, self.services.config.as_ref(), SERVICE_UNAVAILABLE, None);
        host.write_output(diagnostic);
    }
}
