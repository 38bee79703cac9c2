//! Observer hook for factory invocations

use tracing::debug;

use super::bundle::Bundle;
use super::method::MethodId;
use super::value::Value;

/// Notified synchronously while a factory fills a bundle.
pub trait BundleListener: Send + Sync {
    /// Once per written entry.
    fn on_bundling(&self, method: &MethodId, key: &str, value: &Value, required: bool);

    /// Once per successful invocation, with the finished bundle.
    fn on_completed(&self, _method: &MethodId, _bundle: &Bundle) {}
}

/// Logs every bound entry at debug level. Registered by `Binder` debug mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl BundleListener for TracingListener {
    fn on_bundling(&self, method: &MethodId, key: &str, value: &Value, required: bool) {
        debug!(method = %method, key, required, value = ?value, "Bundling value");
    }

    fn on_completed(&self, method: &MethodId, bundle: &Bundle) {
        debug!(method = %method, entries = bundle.len(), "Bundle completed");
    }
}
