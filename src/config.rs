//! Bundlewire configuration
//!
//! Loaded from `bundlewire.toml` (or `--config <path>`):
//!
//! ```toml
//! [resolver]
//! reserved_namespaces = ["android.", "java.", "kotlin."]
//!
//! [runtime]
//! debug = true
//! validate_eagerly = true
//!
//! [emitter]
//! binder_suffix = "_BundleBinder"
//! ```
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`BUNDLEWIRE_DEBUG`)
//! 2. Config file
//! 3. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, Result};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bundlewire.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BundlewireConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub emitter: EmitterConfig,
}

/// Compile-time resolver settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Package prefixes host types may not live in
    #[serde(default = "default_reserved_namespaces")]
    pub reserved_namespaces: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reserved_namespaces: default_reserved_namespaces(),
        }
    }
}

fn default_reserved_namespaces() -> Vec<String> {
    vec!["android.".to_string(), "java.".to_string()]
}

/// Runtime binder settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// Log every bound entry
    #[serde(default)]
    pub debug: bool,

    /// Compile all service methods when the service is created
    #[serde(default)]
    pub validate_eagerly: bool,
}

/// Source emitter settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmitterConfig {
    #[serde(default = "default_binder_suffix")]
    pub binder_suffix: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            binder_suffix: default_binder_suffix(),
        }
    }
}

fn default_binder_suffix() -> String {
    "_BundleBinder".to_string()
}

impl BundlewireConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BundleError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
        })
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BundleError::ConfigError {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if given, else `./bundlewire.toml` if it exists, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge with environment variables
    pub fn with_env(mut self) -> Self {
        if let Ok(value) = std::env::var("BUNDLEWIRE_DEBUG") {
            self.runtime.debug = matches!(value.as_str(), "1" | "true" | "yes");
        }
        self
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BundleError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_reserve_framework_packages() {
        let config = BundlewireConfig::default();
        assert_eq!(config.resolver.reserved_namespaces, vec!["android.", "java."]);
        assert_eq!(config.emitter.binder_suffix, "_BundleBinder");
        assert!(!config.runtime.debug);
    }

    #[test]
    fn partial_files_keep_defaults() {
        let config = BundlewireConfig::from_toml("[runtime]\nvalidate_eagerly = true\n").unwrap();
        assert!(config.runtime.validate_eagerly);
        assert_eq!(config.resolver, ResolverConfig::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]\nreserved_namespaces = [\"kotlin.\"]").unwrap();
        let config = BundlewireConfig::load(file.path()).unwrap();
        assert_eq!(config.resolver.reserved_namespaces, vec!["kotlin."]);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = BundlewireConfig::from_toml("[runtime\n").unwrap_err();
        assert!(matches!(err, BundleError::ConfigError { .. }));
        assert!(BundlewireConfig::load(Path::new("/nonexistent/bundlewire.toml")).is_err());
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut config = BundlewireConfig::default();
        config.runtime.debug = true;
        let toml = config.to_toml().unwrap();
        assert_eq!(BundlewireConfig::from_toml(&toml).unwrap(), config);
    }
}
