//! Lifecycle host: wraps one extension instance with the uniform
//! load / kill / status contract.
//!
//! A host is created at registration and lives for the process lifetime;
//! it is never removed from the registry, a killed extension stays
//! observable. The [`ExtensionHandle`] returned by registration is the
//! canonical reference for the instance: lifecycle operations and
//! subscriptions always go through it, and identity comparison is
//! pointer equality on the `Arc`, not value equality.

use crate::config::ExtensionConfig;
use crate::error::{Result, RuntimeError};
use crate::extension::{DynExtension, Extension, ExtensionContext, ExtensionDescriptor, ExtensionStatus};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Canonical shared reference to a registered extension.
pub type ExtensionHandle = Arc<ExtensionHost>;

/// Owns exactly one extension instance plus its lifecycle state.
pub struct ExtensionHost {
    descriptor: ExtensionDescriptor,
    extension: DynExtension,
    status: RwLock<ExtensionStatus>,
    /// Bound once, when the runtime registers the host.
    context: OnceCell<ExtensionContext>,
}

impl ExtensionHost {
    /// Wrap an extension instance. Registration gives out the handle.
    pub fn new(descriptor: ExtensionDescriptor, extension: Box<dyn Extension>) -> Self {
        Self {
            descriptor,
            extension: Arc::new(RwLock::new(extension)),
            status: RwLock::new(ExtensionStatus::Unloaded),
            context: OnceCell::new(),
        }
    }

    /// The capability this extension satisfies.
    pub fn capability(&self) -> &str {
        self.descriptor.capability()
    }

    /// The concrete identity of this extension.
    pub fn identity(&self) -> &str {
        self.descriptor.identity()
    }

    /// The configuration this instance was built from.
    pub fn config(&self) -> &ExtensionConfig {
        self.descriptor.config()
    }

    /// The descriptor for this instance.
    pub fn descriptor(&self) -> &ExtensionDescriptor {
        &self.descriptor
    }

    /// The wrapped instance, for capability-level calls. The host adds
    /// lifecycle behavior without altering domain behavior; domain calls
    /// go straight to the instance.
    pub fn extension(&self) -> DynExtension {
        Arc::clone(&self.extension)
    }

    /// Identity comparison against another handle.
    pub fn same_as(self: &Arc<Self>, other: &ExtensionHandle) -> bool {
        Arc::ptr_eq(self, other)
    }

    pub(crate) fn bind(&self, context: ExtensionContext) {
        // A host is registered exactly once; a second bind is a no-op.
        let _ = self.context.set(context);
    }

    /// Current lifecycle state. Pure query.
    pub async fn status(&self) -> ExtensionStatus {
        *self.status.read().await
    }

    /// Whether `kill` is currently permitted. Policy comes from the
    /// extension's own declaration. Pure query.
    pub async fn is_killable(&self) -> bool {
        self.extension.read().await.killable()
    }

    /// Transition to `Loaded`.
    ///
    /// Returns `Ok(false)` without side effect when already loaded.
    /// Runs the instance's `on_load` hook; a hook failure surfaces as
    /// [`RuntimeError::LoadFailed`] and the status is left unchanged.
    /// Loading again after a kill is permitted.
    ///
    /// Not atomic across concurrent callers: racing loads may both run
    /// the hook, only the status transition itself is consistent.
    pub async fn load(&self) -> Result<bool> {
        if self.status().await == ExtensionStatus::Loaded {
            return Ok(false);
        }

        let context = self.context.get().ok_or_else(|| {
            RuntimeError::Unbound(self.identity().to_string())
        })?;

        let mut extension = self.extension.write().await;
        if let Err(err) = extension.on_load(context).await {
            return Err(RuntimeError::LoadFailed {
                identity: self.identity().to_string(),
                reason: err.to_string(),
            });
        }
        drop(extension);

        *self.status.write().await = ExtensionStatus::Loaded;
        tracing::info!("Extension loaded: {}/{}", self.capability(), self.identity());
        Ok(true)
    }

    /// Transition to `Killed`.
    ///
    /// Returns `Ok(false)` when already killed (idempotent). Fails with
    /// [`RuntimeError::NotKillable`] when the extension's policy forbids
    /// it, with no state change. Runs the instance's `on_kill` hook; a
    /// hook failure surfaces as [`RuntimeError::KillFailed`] and the
    /// status is left unchanged.
    pub async fn kill(&self) -> Result<bool> {
        if self.status().await == ExtensionStatus::Killed {
            return Ok(false);
        }

        if !self.is_killable().await {
            return Err(RuntimeError::NotKillable(self.identity().to_string()));
        }

        let mut extension = self.extension.write().await;
        if let Err(err) = extension.on_kill().await {
            return Err(RuntimeError::KillFailed {
                identity: self.identity().to_string(),
                reason: err.to_string(),
            });
        }
        drop(extension);

        *self.status.write().await = ExtensionStatus::Killed;
        tracing::info!("Extension killed: {}/{}", self.capability(), self.identity());
        Ok(true)
    }
}

impl std::fmt::Debug for ExtensionHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionHost")
            .field("capability", &self.capability())
            .field("identity", &self.identity())
            .finish()
    }
}
