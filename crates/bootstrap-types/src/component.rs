//! # Registry Components
//!
//! Instances handed out by the class registry, tagged by the capability they
//! provide so callers never downcast framework services by name.

use crate::ports::{ConfigStore, ErrorPresenter, HttpResponder, Logger};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Optional argument passed to a component constructor on first resolution.
pub type ComponentArg = serde_json::Value;

/// A shared component instance.
///
/// Cloning is cheap and yields the same underlying instance.
#[derive(Clone)]
pub enum Component {
    Logger(Arc<dyn Logger>),
    Config(Arc<dyn ConfigStore>),
    Responder(Arc<dyn HttpResponder>),
    Presenter(Arc<dyn ErrorPresenter>),
    /// Application or framework library with no framework-level capability.
    Library(Arc<dyn Any + Send + Sync>),
}

impl Component {
    /// Wrap a concrete library instance.
    pub fn library<T: Any + Send + Sync>(instance: T) -> Self {
        Self::Library(Arc::new(instance))
    }

    /// Name of the capability this instance provides.
    #[must_use]
    pub fn capability(&self) -> &'static str {
        match self {
            Self::Logger(_) => "logger",
            Self::Config(_) => "config",
            Self::Responder(_) => "responder",
            Self::Presenter(_) => "presenter",
            Self::Library(_) => "library",
        }
    }

    pub fn as_logger(&self) -> Option<Arc<dyn Logger>> {
        match self {
            Self::Logger(logger) => Some(Arc::clone(logger)),
            _ => None,
        }
    }

    pub fn as_config(&self) -> Option<Arc<dyn ConfigStore>> {
        match self {
            Self::Config(config) => Some(Arc::clone(config)),
            _ => None,
        }
    }

    pub fn as_responder(&self) -> Option<Arc<dyn HttpResponder>> {
        match self {
            Self::Responder(responder) => Some(Arc::clone(responder)),
            _ => None,
        }
    }

    pub fn as_presenter(&self) -> Option<Arc<dyn ErrorPresenter>> {
        match self {
            Self::Presenter(presenter) => Some(Arc::clone(presenter)),
            _ => None,
        }
    }

    /// Typed handle to a library instance.
    pub fn downcast_library<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Library(instance) => Arc::clone(instance).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Whether both handles point at the same instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        self.data_ptr() == other.data_ptr()
    }

    fn data_ptr(&self) -> *const () {
        match self {
            Self::Logger(c) => Arc::as_ptr(c) as *const (),
            Self::Config(c) => Arc::as_ptr(c) as *const (),
            Self::Responder(c) => Arc::as_ptr(c) as *const (),
            Self::Presenter(c) => Arc::as_ptr(c) as *const (),
            Self::Library(c) => Arc::as_ptr(c) as *const (),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("capability", &self.capability())
            .field("instance", &self.data_ptr())
            .finish()
    }
}
