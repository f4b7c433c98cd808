//! Declarative configuration for the runtime.
//!
//! Configuration is consumed, never produced: one application-level record
//! (`application.json`) lists the extension identifiers to load, and one
//! per-extension record (`extensions/<identifier>.json`) names the
//! capability the extension satisfies, whether it starts automatically,
//! and any implementation-specific settings. Records are loaded once at
//! bootstrap and never mutated afterwards.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Extension identifiers to load, in order.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl AppConfig {
    /// Create a config for the given identifiers.
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

/// Per-extension configuration record.
///
/// The `type` field names the capability this extension satisfies.
/// All unknown fields are kept in `settings` so implementation-specific
/// keys (ports, endpoints, credentials) ride along untyped; their
/// meaning is known only to the extension itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Capability name this extension satisfies.
    #[serde(rename = "type")]
    pub capability: String,

    /// Start automatically at bootstrap.
    #[serde(default)]
    pub autorun: bool,

    /// Implementation-specific settings.
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl ExtensionConfig {
    /// Create a config for the given capability, with no settings.
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            autorun: false,
            settings: serde_json::Map::new(),
        }
    }

    /// Set the autorun flag.
    pub fn with_autorun(mut self, autorun: bool) -> Self {
        self.autorun = autorun;
        self
    }

    /// Add an implementation-specific setting.
    pub fn with_setting(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Get a raw setting value.
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    /// Get a string setting.
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.setting(key).and_then(|v| v.as_str())
    }

    /// Get an unsigned integer setting.
    pub fn setting_u64(&self, key: &str) -> Option<u64> {
        self.setting(key).and_then(|v| v.as_u64())
    }
}

/// File-system configuration loader.
///
/// Reads `<root>/application.json` and `<root>/extensions/<identifier>.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the application-level configuration.
    pub fn application(&self) -> Result<AppConfig> {
        let raw = std::fs::read_to_string(self.root.join("application.json"))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load the configuration record for one extension identifier.
    pub fn extension(&self, identifier: &str) -> Result<ExtensionConfig> {
        let path = self
            .root
            .join("extensions")
            .join(format!("{identifier}.json"));
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_config_flattens_unknown_fields() {
        let raw = r#"{ "type": "network", "autorun": true, "port": 4444, "server": "localhost" }"#;
        let config: ExtensionConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.capability, "network");
        assert!(config.autorun);
        assert_eq!(config.setting_u64("port"), Some(4444));
        assert_eq!(config.setting_str("server"), Some("localhost"));
        assert!(config.setting("missing").is_none());
    }

    #[test]
    fn autorun_defaults_to_false() {
        let config: ExtensionConfig = serde_json::from_str(r#"{ "type": "gui" }"#).unwrap();
        assert!(!config.autorun);
        assert!(config.settings.is_empty());
    }

    #[test]
    fn builder_round_trips_through_json() {
        let config = ExtensionConfig::new("network")
            .with_autorun(true)
            .with_setting("port", 4444);

        let raw = serde_json::to_string(&config).unwrap();
        let parsed: ExtensionConfig = serde_json::from_str(&raw).unwrap();

        assert_eq!(parsed.capability, "network");
        assert!(parsed.autorun);
        assert_eq!(parsed.setting_u64("port"), Some(4444));
    }

    #[test]
    fn app_config_parses_extension_list() {
        let raw = r#"{ "extensions": ["network.tcp", "network.udp"] }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.extensions, vec!["network.tcp", "network.udp"]);
    }
}
