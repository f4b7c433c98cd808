//! The process-scoped runtime: registry + event bus + bootstrap.
//!
//! One `Runtime` exists per process. It is constructed explicitly at
//! startup and injected into extensions through
//! [`ExtensionContext`](crate::extension::ExtensionContext); nothing in
//! this crate is a global.

use crate::catalog::ExtensionCatalog;
use crate::config::{AppConfig, ConfigStore};
use crate::error::Result;
use crate::eventbus::EventBus;
use crate::extension::{Extension, ExtensionContext, ExtensionDescriptor};
use crate::host::{ExtensionHandle, ExtensionHost};
use crate::registry::ExtensionRegistry;
use std::sync::Arc;

/// Shared handle to the process-scoped runtime.
pub type SharedRuntime = Arc<Runtime>;

/// Registry, event bus and application configuration under one roof.
pub struct Runtime {
    registry: ExtensionRegistry,
    events: EventBus,
    config: AppConfig,
}

impl Runtime {
    /// Create an empty runtime for the given application configuration.
    pub fn new(config: AppConfig) -> SharedRuntime {
        Arc::new(Self {
            registry: ExtensionRegistry::new(),
            events: EventBus::new(),
            config,
        })
    }

    /// The extension registry.
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// The event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Wrap an instance in a host, register it, and bind its context.
    ///
    /// The returned handle is the canonical reference for the instance;
    /// callers hold it instead of a bare reference.
    pub async fn register(
        self: &Arc<Self>,
        descriptor: ExtensionDescriptor,
        extension: Box<dyn Extension>,
    ) -> Result<ExtensionHandle> {
        let host = ExtensionHost::new(descriptor, extension);
        let handle = self.registry.register(host).await?;
        handle.bind(ExtensionContext::new(Arc::clone(self), Arc::clone(&handle)));
        Ok(handle)
    }

    /// Bring the configured application up.
    ///
    /// Strict order: load the application configuration; then, per
    /// configured identifier, load its record, construct the extension
    /// through the catalog and register it, collecting autorun handles
    /// in configuration order; finally `load()` each autorun handle in
    /// that order. A failure provisioning or loading one extension is
    /// reported and that extension is skipped, it does not abort the
    /// rest.
    pub async fn bootstrap(store: &ConfigStore, catalog: &ExtensionCatalog) -> Result<SharedRuntime> {
        let app = store.application()?;
        let runtime = Runtime::new(app);

        let mut autorun = Vec::new();
        for identifier in runtime.config.extensions.clone() {
            match Self::provision(&runtime, store, catalog, &identifier).await {
                Ok(Some(handle)) => autorun.push(handle),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("Skipping extension {}: {}", identifier, err);
                }
            }
        }

        for handle in autorun {
            if let Err(err) = handle.load().await {
                tracing::warn!(
                    "Autorun load failed for {}/{}: {}",
                    handle.capability(),
                    handle.identity(),
                    err
                );
            }
        }

        Ok(runtime)
    }

    /// Provision one configured extension. Returns its handle when it
    /// is flagged autorun.
    async fn provision(
        runtime: &SharedRuntime,
        store: &ConfigStore,
        catalog: &ExtensionCatalog,
        identifier: &str,
    ) -> Result<Option<ExtensionHandle>> {
        let config = store.extension(identifier)?;
        let extension = catalog.construct(identifier, &config)?;
        let autorun = config.autorun;

        let descriptor = ExtensionDescriptor::from_config(identifier, config);
        let handle = runtime.register(descriptor, extension).await?;

        Ok(autorun.then_some(handle))
    }

    /// Best-effort teardown: kill every registered extension.
    ///
    /// Failures (including `NotKillable` policy refusals) are logged and
    /// do not stop the sweep.
    pub async fn shutdown(&self) {
        for handle in self.registry.handles().await {
            if let Err(err) = handle.kill().await {
                tracing::warn!(
                    "Shutdown kill failed for {}/{}: {}",
                    handle.capability(),
                    handle.identity(),
                    err
                );
            }
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
