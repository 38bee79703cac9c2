//! Runtime Module - method factories and the binder
//!
//! Contains the runtime side of bundle binding:
//! - `method`: method descriptors and their identity ([`MethodId`])
//! - `value` / `bundle`: tagged values and the key-value container
//! - `handler` / `factory`: compiled per-method bundle builders
//! - `cache`: the memoized, thread-safe factory cache
//! - `listener`: observer hook called while bundles are filled
//! - `binder`: [`Binder`] facade and callable [`Service`]s

mod binder;
mod bundle;
mod cache;
mod factory;
mod handler;
mod listener;
mod method;
mod value;

pub use binder::{Binder, BinderBuilder, Service};
pub use bundle::Bundle;
pub use cache::FactoryCache;
pub use factory::MethodFactory;
pub use handler::ParameterHandler;
pub use listener::{BundleListener, TracingListener};
pub use method::{MethodDescriptor, MethodId, ParameterDescriptor, ServiceInterface};
pub use value::{ParcelObject, Value};
