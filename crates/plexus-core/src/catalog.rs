//! Named-constructor table mapping identity strings to factories.
//!
//! Identity strings in configuration locate concrete implementations.
//! Instead of reflective class loading, the catalog is populated
//! explicitly before bootstrap: each identity maps to a factory closure
//! that builds the extension from its parsed configuration.

use crate::config::ExtensionConfig;
use crate::error::{ExtResult, Result, RuntimeError};
use crate::extension::Extension;
use std::collections::HashMap;

/// Factory building one extension instance from its configuration.
pub type ExtensionConstructor =
    Box<dyn Fn(&ExtensionConfig) -> ExtResult<Box<dyn Extension>> + Send + Sync>;

/// Identity -> constructor table.
#[derive(Default)]
pub struct ExtensionCatalog {
    constructors: HashMap<String, ExtensionConstructor>,
}

impl ExtensionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under an identity.
    ///
    /// Fails with [`RuntimeError::DuplicateConstructor`] when the
    /// identity is already taken.
    pub fn register<F>(&mut self, identity: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn(&ExtensionConfig) -> ExtResult<Box<dyn Extension>> + Send + Sync + 'static,
    {
        let identity = identity.into();
        if self.constructors.contains_key(&identity) {
            return Err(RuntimeError::DuplicateConstructor(identity));
        }
        self.constructors.insert(identity, Box::new(constructor));
        Ok(())
    }

    /// Build an extension for an identity.
    ///
    /// Fails with [`RuntimeError::UnknownIdentity`] when no constructor
    /// is registered; a constructor failure surfaces as
    /// [`RuntimeError::LoadFailed`].
    pub fn construct(
        &self,
        identity: &str,
        config: &ExtensionConfig,
    ) -> Result<Box<dyn Extension>> {
        let constructor = self
            .constructors
            .get(identity)
            .ok_or_else(|| RuntimeError::UnknownIdentity(identity.to_string()))?;

        constructor(config).map_err(|err| RuntimeError::LoadFailed {
            identity: identity.to_string(),
            reason: err.to_string(),
        })
    }

    /// Whether a constructor exists for the identity.
    pub fn contains(&self, identity: &str) -> bool {
        self.constructors.contains_key(identity)
    }

    /// All registered identities.
    pub fn identities(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for ExtensionCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionCatalog")
            .field("identities", &self.identities())
            .finish()
    }
}
