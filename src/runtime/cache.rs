//! Factory cache - method id to compiled factory, shared across threads
//!
//! Lookups go through the `DashMap` without taking the compile lock. A miss
//! takes the single compile lock, looks again, compiles and publishes before
//! the lock is released, so concurrent first calls for one method compile it
//! once. Entries are never evicted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::factory::MethodFactory;
use super::method::{MethodDescriptor, MethodId};
use crate::error::Result;
use crate::types::TypeHierarchy;

/// Process-wide cache, created on first use.
static GLOBAL_CACHE: Lazy<Arc<FactoryCache>> = Lazy::new(|| Arc::new(FactoryCache::new()));

#[derive(Debug, Default)]
pub struct FactoryCache {
    factories: DashMap<MethodId, Arc<MethodFactory>>,
    compile_lock: Mutex<()>,
    compilations: AtomicUsize,
}

impl FactoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Arc<FactoryCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// Cached factory for `method`, compiling it on first use.
    ///
    /// Compile errors are returned to the caller and nothing is cached, so a
    /// later call reports the same error again.
    pub fn get_or_compile(
        &self,
        method: &MethodDescriptor,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<Arc<MethodFactory>> {
        let id = method.id();
        if let Some(factory) = self.get(&id) {
            trace!(method = %id, "Factory cache hit");
            return Ok(factory);
        }

        let _guard = self.compile_lock.lock();
        if let Some(factory) = self.get(&id) {
            return Ok(factory);
        }

        let factory = Arc::new(MethodFactory::compile(method, hierarchy)?);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        self.factories.insert(id, Arc::clone(&factory));
        debug!(method = %factory.method(), handlers = factory.arity(), "Compiled method factory");
        Ok(factory)
    }

    pub fn get(&self, id: &MethodId) -> Option<Arc<MethodFactory>> {
        self.factories.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &MethodId) -> bool {
        self.factories.contains_key(id)
    }

    /// Number of successful compilations since creation.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationUse;
    use crate::runtime::ParameterDescriptor;
    use crate::types::{TypeRef, TypeTable};

    fn method(name: &str) -> MethodDescriptor {
        MethodDescriptor::new("a.Api", name, TypeRef::bundle()).param(
            ParameterDescriptor::new(TypeRef::parse("long").unwrap())
                .annotated(AnnotationUse::keyed("LongValue", "id")),
        )
    }

    #[test]
    fn second_lookup_hits_the_cache() {
        let cache = FactoryCache::new();
        let table = TypeTable::jdk();
        let first = cache.get_or_compile(&method("m"), &table).unwrap();
        let second = cache.get_or_compile(&method("m"), &table).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.compilations(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = FactoryCache::new();
        let table = TypeTable::jdk();
        let mut broken = method("broken");
        broken.return_type = TypeRef::parse("java.lang.String").unwrap();
        assert!(cache.get_or_compile(&broken, &table).is_err());
        assert!(cache.get_or_compile(&broken, &table).is_err());
        assert!(cache.is_empty());
        assert!(!cache.contains(&broken.id()));
    }

    #[test]
    fn global_cache_is_shared() {
        assert!(Arc::ptr_eq(&FactoryCache::global(), &FactoryCache::global()));
    }
}
