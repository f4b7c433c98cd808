//! The extension contract.
//!
//! An extension is any type implementing [`Extension`]. The trait carries
//! only the lifecycle hooks and the event-bus callback; the domain
//! capability an extension satisfies is its own business, reached either
//! through events or by downcasting via [`Extension::as_any`]. The
//! runtime stores and forwards, it never interprets capability-specific
//! interfaces.

use crate::config::ExtensionConfig;
use crate::error::ExtResult;
use crate::event::Event;
use crate::eventbus::EventBus;
use crate::host::ExtensionHandle;
use crate::registry::ExtensionRegistry;
use crate::runtime::SharedRuntime;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lifecycle state of a registered extension.
///
/// `Unloaded` is only ever the initial state; once left it is never
/// re-entered. A killed extension may be loaded again (becoming
/// `Loaded`), the killable policy gates only whether `kill` is
/// attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionStatus {
    /// Registered but never initialized.
    #[default]
    Unloaded,
    /// Initialized and running.
    Loaded,
    /// Torn down. Terminal but observable; the host stays registered.
    Killed,
}

impl ExtensionStatus {
    /// Lowercase name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionStatus::Unloaded => "unloaded",
            ExtensionStatus::Loaded => "loaded",
            ExtensionStatus::Killed => "killed",
        }
    }
}

impl std::fmt::Display for ExtensionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The contract every extension implements.
///
/// All hooks have defaults, so a minimal extension only provides
/// `as_any`. Extensions must not assume which thread their hooks run on
/// and, by convention, must not block indefinitely inside
/// `handle_event`: a slow handler stalls that publish call for the
/// handlers queued after it.
#[async_trait::async_trait]
pub trait Extension: Send + Sync {
    /// Whether `kill` may be attempted on this extension.
    fn killable(&self) -> bool {
        true
    }

    /// Initialization hook, run on the unloaded-to-loaded transition.
    ///
    /// Receives the runtime context so the extension can subscribe to
    /// events, look up collaborators, or keep the context for later.
    async fn on_load(&mut self, _ctx: &ExtensionContext) -> ExtResult<()> {
        Ok(())
    }

    /// Teardown hook, run on the transition to killed.
    async fn on_kill(&mut self) -> ExtResult<()> {
        Ok(())
    }

    /// Event-bus callback for subscribed patterns.
    async fn handle_event(&self, _event: &Event) -> ExtResult<()> {
        Ok(())
    }

    /// Capability access: consumers that looked up a concrete identity
    /// downcast to the real type to use its domain interface.
    fn as_any(&self) -> &dyn Any;
}

impl std::fmt::Debug for dyn Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Extension")
    }
}

/// A live extension instance behind shared ownership.
pub type DynExtension = Arc<RwLock<Box<dyn Extension>>>;

/// Identifies one configured extension instance.
#[derive(Debug, Clone)]
pub struct ExtensionDescriptor {
    capability: String,
    identity: String,
    config: ExtensionConfig,
}

impl ExtensionDescriptor {
    /// Build a descriptor from its parts.
    pub fn new(
        capability: impl Into<String>,
        identity: impl Into<String>,
        config: ExtensionConfig,
    ) -> Self {
        Self {
            capability: capability.into(),
            identity: identity.into(),
            config,
        }
    }

    /// Build a descriptor straight from a configuration record.
    pub fn from_config(identity: impl Into<String>, config: ExtensionConfig) -> Self {
        Self {
            capability: config.capability.clone(),
            identity: identity.into(),
            config,
        }
    }

    /// The abstract capability this extension satisfies.
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// The concrete identity of this extension.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The parsed configuration for this instance.
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }
}

/// Runtime context handed to an extension at load time.
///
/// One process-scoped runtime exists; extensions receive it here instead
/// of reaching for globals. The handle is the extension's own canonical
/// reference, the one the registry returned at registration.
#[derive(Clone)]
pub struct ExtensionContext {
    runtime: SharedRuntime,
    handle: ExtensionHandle,
}

impl ExtensionContext {
    pub(crate) fn new(runtime: SharedRuntime, handle: ExtensionHandle) -> Self {
        Self { runtime, handle }
    }

    /// The process-scoped runtime.
    pub fn runtime(&self) -> &SharedRuntime {
        &self.runtime
    }

    /// This extension's own canonical handle.
    pub fn handle(&self) -> &ExtensionHandle {
        &self.handle
    }

    /// Shortcut to the event bus.
    pub fn events(&self) -> &EventBus {
        self.runtime.events()
    }

    /// Shortcut to the extension registry.
    pub fn registry(&self) -> &ExtensionRegistry {
        self.runtime.registry()
    }
}

impl std::fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("capability", &self.handle.capability())
            .field("identity", &self.handle.identity())
            .finish()
    }
}
