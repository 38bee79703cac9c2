//! Binder - the runtime entry point
//!
//! A [`Binder`] ties a factory cache, a type hierarchy and listeners
//! together. Services created from it dispatch calls by method name:
//!
//! ```text
//! Binder::builder().debug(true).build()
//!     .create(&service)?          // interface check, optional eager compile
//!     .call("login", &args)?      // cached factory -> Bundle
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::bundle::Bundle;
use super::cache::FactoryCache;
use super::factory::MethodFactory;
use super::listener::{BundleListener, TracingListener};
use super::method::{MethodDescriptor, ServiceInterface};
use super::value::Value;
use crate::config::RuntimeConfig;
use crate::error::{BundleError, Result};
use crate::model::TypeKind;
use crate::types::{TypeHierarchy, TypeTable};

static DEFAULT_BINDER: OnceCell<Binder> = OnceCell::new();

pub struct Binder {
    cache: Arc<FactoryCache>,
    hierarchy: Arc<dyn TypeHierarchy>,
    listeners: Vec<Arc<dyn BundleListener>>,
    validate_eagerly: bool,
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("cached_factories", &self.cache.len())
            .field("listeners", &self.listeners.len())
            .field("validate_eagerly", &self.validate_eagerly)
            .finish()
    }
}

impl Binder {
    pub fn builder() -> BinderBuilder {
        BinderBuilder::default()
    }

    /// The binder installed with [`BinderBuilder::install_default`].
    pub fn installed() -> Option<&'static Binder> {
        DEFAULT_BINDER.get()
    }

    pub fn cache(&self) -> &Arc<FactoryCache> {
        &self.cache
    }

    pub fn validates_eagerly(&self) -> bool {
        self.validate_eagerly
    }

    /// Compiled factory for `method`, from the cache when possible.
    pub fn factory(&self, method: &MethodDescriptor) -> Result<Arc<MethodFactory>> {
        self.cache.get_or_compile(method, self.hierarchy.as_ref())
    }

    pub fn invoke(&self, method: &MethodDescriptor, args: &[Option<Value>]) -> Result<Bundle> {
        self.factory(method)?.invoke_with(args, &self.listeners)
    }

    /// Turn an interface into a callable service.
    pub fn create(&self, service: &ServiceInterface) -> Result<Service<'_>> {
        if service.kind != TypeKind::Interface {
            return Err(BundleError::NotAnInterface {
                service: service.name.clone(),
            });
        }
        if self.validate_eagerly {
            for method in &service.methods {
                self.factory(method)?;
            }
            debug!(service = %service.name, methods = service.methods.len(), "Validated service eagerly");
        }
        Ok(Service {
            binder: self,
            interface: service.clone(),
        })
    }
}

#[derive(Default)]
pub struct BinderBuilder {
    debug: bool,
    validate_eagerly: bool,
    listeners: Vec<Arc<dyn BundleListener>>,
    hierarchy: Option<Arc<dyn TypeHierarchy>>,
    cache: Option<Arc<FactoryCache>>,
}

impl BinderBuilder {
    /// Log every bound entry through `tracing`.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Compile every method of a service when it is created.
    pub fn validate_eagerly(mut self, validate: bool) -> Self {
        self.validate_eagerly = validate;
        self
    }

    pub fn add_listener(mut self, listener: Arc<dyn BundleListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Supertype facts used to check parameter types. Defaults to the JDK table.
    pub fn hierarchy(mut self, hierarchy: Arc<dyn TypeHierarchy>) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }

    /// Factory cache to use. Defaults to the process-wide cache.
    pub fn cache(mut self, cache: Arc<FactoryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Apply `[runtime]` settings.
    pub fn config(self, config: &RuntimeConfig) -> Self {
        self.debug(config.debug).validate_eagerly(config.validate_eagerly)
    }

    pub fn build(self) -> Binder {
        let mut listeners = self.listeners;
        if self.debug {
            listeners.insert(0, Arc::new(TracingListener));
        }
        Binder {
            cache: self.cache.unwrap_or_else(FactoryCache::global),
            hierarchy: self
                .hierarchy
                .unwrap_or_else(|| Arc::new(TypeTable::jdk()) as Arc<dyn TypeHierarchy>),
            listeners,
            validate_eagerly: self.validate_eagerly,
        }
    }

    /// Build and install as the process-wide default. Only the first
    /// install succeeds.
    pub fn install_default(self) -> Result<&'static Binder> {
        let binder = self.build();
        DEFAULT_BINDER
            .set(binder)
            .map_err(|_| BundleError::AlreadyInstalled)?;
        info!("Installed default binder");
        DEFAULT_BINDER.get().ok_or(BundleError::AlreadyInstalled)
    }
}

/// A service interface bound to a binder.
#[derive(Debug)]
pub struct Service<'a> {
    binder: &'a Binder,
    interface: ServiceInterface,
}

impl Service<'_> {
    pub fn interface(&self) -> &ServiceInterface {
        &self.interface
    }

    fn method(&self, name: &str) -> Result<&MethodDescriptor> {
        self.interface
            .method_named(name)
            .ok_or_else(|| BundleError::UnknownMethod {
                service: self.interface.name.clone(),
                method: name.to_string(),
            })
    }

    /// Call method `name` with `args`, one per parameter.
    pub fn call(&self, name: &str, args: &[Option<Value>]) -> Result<Bundle> {
        self.binder.invoke(self.method(name)?, args)
    }

    /// Like [`Service::call`] with JSON arguments; `null` is absent.
    pub fn call_json(&self, name: &str, args: &[JsonValue]) -> Result<Bundle> {
        let factory = self.binder.factory(self.method(name)?)?;
        let args = factory.arguments_from_json(args)?;
        factory.invoke_with(&args, &self.binder.listeners)
    }
}
