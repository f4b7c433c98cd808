//! Publish/subscribe bus routing named events between extensions.
//!
//! Subscriptions pair an event-name pattern with a subscriber handle and
//! are kept in subscription order. Dispatch is synchronous from the
//! caller's perspective: `publish` returns only after every matched
//! subscriber has been invoked (or failed). Matching follows the
//! dot-hierarchy rule in [`crate::event::name_matches`].

use crate::event::{name_matches, Event};
use crate::host::ExtensionHandle;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Subscription {
    pattern: String,
    handle: ExtensionHandle,
}

/// The event bus.
///
/// Shared and concurrently accessed after bootstrap; the subscription
/// list sits behind a reader-writer lock and every publish dispatches
/// from a snapshot, so a subscriber added during dispatch is not invoked
/// for the in-flight event and removal during dispatch cannot break
/// iteration.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handle under a pattern.
    ///
    /// Idempotent: the same handle under the same exact pattern string
    /// is a no-op. A handle may hold several subscriptions under
    /// different patterns; an event matched by more than one of them is
    /// delivered once per matching subscription.
    pub async fn subscribe(&self, pattern: impl Into<String>, handle: ExtensionHandle) {
        let pattern = pattern.into();
        let mut subscriptions = self.subscriptions.write().await;

        let already = subscriptions
            .iter()
            .any(|s| s.pattern == pattern && Arc::ptr_eq(&s.handle, &handle));
        if already {
            return;
        }

        tracing::debug!(
            "Subscribed {}/{} to \"{}\"",
            handle.capability(),
            handle.identity(),
            pattern
        );
        subscriptions.push(Subscription { pattern, handle });
    }

    /// Remove a handle from every subscription whose pattern is
    /// hierarchically matched by `name`: unsubscribing `network` also
    /// drops a `network.message` subscription.
    pub async fn unsubscribe(&self, name: &str, handle: &ExtensionHandle) {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions
            .retain(|s| !(name_matches(name, &s.pattern) && Arc::ptr_eq(&s.handle, handle)));
    }

    /// Publish an event to every matching subscriber, in subscription
    /// order, awaiting each handler before the next.
    ///
    /// A failing handler is logged and does not abort the fan-out
    /// (failure isolation only: a slow handler still stalls the handlers
    /// after it). Returns the number of successful deliveries.
    pub async fn publish(&self, event: Event) -> usize {
        let targets: Vec<ExtensionHandle> = {
            let subscriptions = self.subscriptions.read().await;
            subscriptions
                .iter()
                .filter(|s| event.matches(&s.pattern))
                .map(|s| Arc::clone(&s.handle))
                .collect()
        };

        let mut delivered = 0;
        for handle in targets {
            let extension = handle.extension();
            let guard = extension.read().await;
            match guard.handle_event(&event).await {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(
                        "Subscriber {}/{} failed handling \"{}\": {}",
                        handle.capability(),
                        handle.identity(),
                        event.name,
                        err
                    );
                }
            }
        }
        delivered
    }

    /// Build and publish an event from the default source.
    pub async fn publish_named(&self, name: impl Into<String>, payload: serde_json::Value) -> usize {
        self.publish(Event::new(name, payload)).await
    }

    /// Build and publish an event with an explicit source.
    pub async fn publish_from(
        &self,
        name: impl Into<String>,
        payload: serde_json::Value,
        source: impl Into<String>,
    ) -> usize {
        self.publish(Event::with_source(name, payload, source)).await
    }

    /// Number of live subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}
