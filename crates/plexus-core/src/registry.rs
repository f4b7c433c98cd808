//! Two-level extension index: capability, then concrete identity.
//!
//! The two-level key mirrors the two real query patterns: "give me
//! something that does X" (capability only, possibly many answers) and
//! "give me exactly this implementation of X" (capability + identity,
//! exactly one). Capability-only queries stay proportional to the
//! bucket, not to the whole registry.
//!
//! Registration happens during single-threaded bootstrap; afterwards the
//! registry is a shared read-mostly resource, so the index sits behind a
//! reader-writer lock.

use crate::error::{Result, RuntimeError};
use crate::host::{ExtensionHandle, ExtensionHost};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Capability -> ordered handles index.
///
/// Entries are write-once: a (capability, identity) pair is registered at
/// most once and never removed, so every handle reachable from the
/// registry is reachable under exactly one key.
#[derive(Default)]
pub struct ExtensionRegistry {
    buckets: RwLock<HashMap<String, Vec<ExtensionHandle>>>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a host and hand back its canonical handle.
    ///
    /// Fails with [`RuntimeError::DuplicateRegistration`] when the
    /// (capability, identity) pair already exists.
    pub async fn register(&self, host: ExtensionHost) -> Result<ExtensionHandle> {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(host.capability().to_string()).or_default();

        if bucket.iter().any(|h| h.identity() == host.identity()) {
            return Err(RuntimeError::DuplicateRegistration {
                capability: host.capability().to_string(),
                identity: host.identity().to_string(),
            });
        }

        let handle: ExtensionHandle = Arc::new(host);
        bucket.push(Arc::clone(&handle));
        tracing::info!(
            "Extension registered: {}/{}",
            handle.capability(),
            handle.identity()
        );
        Ok(handle)
    }

    /// All handles for a capability, in registration order.
    ///
    /// Fails with [`RuntimeError::UnknownCapability`] when the capability
    /// was never registered: nothing configured is a configuration error,
    /// distinct from an empty result.
    pub async fn lookup_all(&self, capability: &str) -> Result<Vec<ExtensionHandle>> {
        let buckets = self.buckets.read().await;
        buckets
            .get(capability)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownCapability(capability.to_string()))
    }

    /// The first-registered handle for a capability.
    pub async fn lookup_one(&self, capability: &str) -> Result<ExtensionHandle> {
        let buckets = self.buckets.read().await;
        buckets
            .get(capability)
            .and_then(|bucket| bucket.first())
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownCapability(capability.to_string()))
    }

    /// Exact (capability, identity) lookup. Absence is a normal empty
    /// result, not an error.
    pub async fn lookup_by_identity(
        &self,
        capability: &str,
        identity: &str,
    ) -> Option<ExtensionHandle> {
        let buckets = self.buckets.read().await;
        buckets
            .get(capability)?
            .iter()
            .find(|h| h.identity() == identity)
            .cloned()
    }

    /// Every registered handle, across all capabilities.
    pub async fn handles(&self) -> Vec<ExtensionHandle> {
        let buckets = self.buckets.read().await;
        buckets.values().flatten().cloned().collect()
    }

    /// All registered capability names.
    pub async fn capabilities(&self) -> Vec<String> {
        let buckets = self.buckets.read().await;
        buckets.keys().cloned().collect()
    }

    /// Whether any extension is registered for the capability.
    pub async fn contains(&self, capability: &str) -> bool {
        self.buckets.read().await.contains_key(capability)
    }

    /// Total number of registered extensions.
    pub async fn count(&self) -> usize {
        self.buckets.read().await.values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry").finish_non_exhaustive()
    }
}
