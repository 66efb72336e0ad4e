//! # Component Catalog
//!
//! The table of known implementations: every entry is a factory registered
//! under a search root, a category directory and a file name. Resolution
//! probes this table the way the framework probes its directory tree.

use bootstrap_types::{Component, ComponentArg, ConfigStore, ConstructionError, HostEnvironment};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a component instance.
pub type Factory =
    Arc<dyn Fn(&Construction<'_>) -> Result<Component, ConstructionError> + Send + Sync>;

/// One of the two places implementations live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchRoot {
    /// The application's own tree; probed first and the only home of overrides.
    Application,
    /// The framework's tree.
    Framework,
}

impl SearchRoot {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Framework => "framework",
        }
    }
}

impl fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Probe order and override naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    subclass_prefix: String,
}

impl SearchPath {
    /// Prefix used when the configuration does not set `subclass_prefix`.
    pub const DEFAULT_SUBCLASS_PREFIX: &'static str = "MY_";
    /// Configuration key holding the override prefix.
    pub const SUBCLASS_PREFIX_KEY: &'static str = "subclass_prefix";

    pub fn new(subclass_prefix: impl Into<String>) -> Self {
        Self {
            subclass_prefix: subclass_prefix.into(),
        }
    }

    /// Read the override prefix from configuration.
    pub fn from_config(config: &dyn ConfigStore) -> Self {
        config
            .item_str(Self::SUBCLASS_PREFIX_KEY)
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Base probe order.
    #[must_use]
    pub fn roots(&self) -> [SearchRoot; 2] {
        [SearchRoot::Application, SearchRoot::Framework]
    }

    #[must_use]
    pub fn subclass_prefix(&self) -> &str {
        &self.subclass_prefix
    }

    /// File name an application override of `name` must use.
    #[must_use]
    pub fn override_name(&self, name: &str) -> String {
        format!("{}{}", self.subclass_prefix, name)
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SUBCLASS_PREFIX)
    }
}

/// What factories get to build with. The registry itself is not part of it.
#[derive(Clone)]
pub struct Services {
    pub host: Arc<dyn HostEnvironment>,
    pub config: Arc<dyn ConfigStore>,
}

impl Services {
    pub fn new(host: Arc<dyn HostEnvironment>, config: Arc<dyn ConfigStore>) -> Self {
        Self { host, config }
    }
}

/// A catalog hit.
#[derive(Clone)]
pub struct Located {
    pub root: SearchRoot,
    pub class_name: String,
    factory: Factory,
}

impl fmt::Debug for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Located")
            .field("root", &self.root)
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

/// Outcome of probing the catalog for one name.
#[derive(Debug, Clone)]
pub struct ResolutionPlan {
    /// First base implementation found along the search path.
    pub base: Option<Located>,
    /// Application override, bound in place of the base when present.
    pub extension: Option<Located>,
}

impl ResolutionPlan {
    /// The implementation that will actually be constructed.
    #[must_use]
    pub fn bound(&self) -> Option<&Located> {
        self.extension.as_ref().or(self.base.as_ref())
    }

    /// Class name bound to the requested component name.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.bound().map(|located| located.class_name.as_str())
    }

    pub(crate) fn construct(
        &self,
        requested: &str,
        services: &Services,
        arg: Option<&ComponentArg>,
    ) -> Result<Component, ConstructionError> {
        let bound = self
            .bound()
            .ok_or_else(|| ConstructionError::MissingBase(requested.to_string()))?;
        let base = if self.extension.is_some() {
            self.base.as_ref()
        } else {
            None
        };
        let construction = Construction {
            requested,
            class_name: &bound.class_name,
            arg,
            services,
            base,
        };
        (bound.factory)(&construction)
    }
}

/// Everything a factory may use while building an instance.
pub struct Construction<'a> {
    requested: &'a str,
    class_name: &'a str,
    arg: Option<&'a ComponentArg>,
    services: &'a Services,
    base: Option<&'a Located>,
}

impl Construction<'_> {
    /// Name the caller asked the registry for.
    pub fn requested_name(&self) -> &str {
        self.requested
    }

    /// Class name being constructed (the override name for extensions).
    pub fn class_name(&self) -> &str {
        self.class_name
    }

    pub fn arg(&self) -> Option<&ComponentArg> {
        self.arg
    }

    pub fn services(&self) -> &Services {
        self.services
    }

    pub fn host(&self) -> Arc<dyn HostEnvironment> {
        Arc::clone(&self.services.host)
    }

    pub fn config(&self) -> Arc<dyn ConfigStore> {
        Arc::clone(&self.services.config)
    }

    /// Deserialize the constructor argument, or use defaults when none was
    /// given.
    pub fn options<T: DeserializeOwned + Default>(&self) -> Result<T, ConstructionError> {
        match self.arg {
            Some(arg) => serde_json::from_value(arg.clone())
                .map_err(|e| ConstructionError::InvalidArgument(e.to_string())),
            None => Ok(T::default()),
        }
    }

    /// Build the base implementation this override extends, with the same
    /// constructor argument.
    pub fn construct_base(&self) -> Result<Component, ConstructionError> {
        let base = self
            .base
            .ok_or_else(|| ConstructionError::MissingBase(self.requested.to_string()))?;
        let construction = Construction {
            requested: self.requested,
            class_name: &base.class_name,
            arg: self.arg,
            services: self.services,
            base: None,
        };
        (base.factory)(&construction)
    }
}

/// Table of component implementations.
#[derive(Default, Clone)]
pub struct Catalog {
    entries: HashMap<(SearchRoot, String, String), Factory>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` as `<root>/<directory>/<file>`, replacing any
    /// previous registration at the same place.
    pub fn provide<F>(&mut self, root: SearchRoot, directory: &str, file: &str, factory: F) -> &mut Self
    where
        F: Fn(&Construction<'_>) -> Result<Component, ConstructionError> + Send + Sync + 'static,
    {
        self.entries.insert(
            (root, directory.to_string(), file.to_string()),
            Arc::new(factory),
        );
        self
    }

    /// Builder form of [`Catalog::provide`].
    #[must_use]
    pub fn with<F>(mut self, root: SearchRoot, directory: &str, file: &str, factory: F) -> Self
    where
        F: Fn(&Construction<'_>) -> Result<Component, ConstructionError> + Send + Sync + 'static,
    {
        self.provide(root, directory, file, factory);
        self
    }

    pub fn contains(&self, root: SearchRoot, directory: &str, file: &str) -> bool {
        self.entries
            .contains_key(&(root, directory.to_string(), file.to_string()))
    }

    pub fn locate(&self, root: SearchRoot, directory: &str, file: &str) -> Option<Located> {
        self.entries
            .get(&(root, directory.to_string(), file.to_string()))
            .map(|factory| Located {
                root,
                class_name: file.to_string(),
                factory: Arc::clone(factory),
            })
    }

    /// Probe for `name`: base along the search path, then the application
    /// override. `None` when neither exists.
    pub fn plan(&self, path: &SearchPath, directory: &str, name: &str) -> Option<ResolutionPlan> {
        let base = path
            .roots()
            .into_iter()
            .find_map(|root| self.locate(root, directory, name));
        let extension = self.locate(SearchRoot::Application, directory, &path.override_name(name));

        if base.is_none() && extension.is_none() {
            return None;
        }
        Some(ResolutionPlan { base, extension })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
