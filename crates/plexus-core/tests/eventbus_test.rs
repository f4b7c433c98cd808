//! Event bus behavior: hierarchical matching, subscription bookkeeping,
//! synchronous fan-out and failure isolation.

use plexus_core::prelude::*;
use plexus_testing::{init_tracing, EventLog, FailingExtension, RecordingExtension};
use serde_json::json;
use std::any::Any;
use std::sync::{Arc, Mutex};

async fn register(
    runtime: &SharedRuntime,
    identity: &str,
    extension: Box<dyn Extension>,
) -> ExtensionHandle {
    let descriptor = ExtensionDescriptor::new("observer", identity, ExtensionConfig::new("observer"));
    runtime
        .register(descriptor, extension)
        .await
        .expect("registration")
}

#[tokio::test]
async fn patterns_match_self_and_descendants() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "probe",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;
    runtime.events().subscribe("a.b", handle.clone()).await;

    assert_eq!(runtime.events().publish_named("a.b.c", json!(1)).await, 1);
    assert_eq!(runtime.events().publish_named("a.b", json!(2)).await, 1);
    assert_eq!(runtime.events().publish_named("a.c", json!(3)).await, 0);
    assert_eq!(runtime.events().publish_named("a", json!(4)).await, 0);

    assert_eq!(log.names(), vec!["a.b.c", "a.b"]);
}

#[tokio::test]
async fn token_prefixes_are_not_descendants() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "probe",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;
    runtime.events().subscribe("network", handle.clone()).await;

    assert_eq!(runtime.events().publish_named("networking", json!({})).await, 0);
    assert!(log.events().is_empty());
}

#[tokio::test]
async fn duplicate_subscribe_is_a_noop() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "probe",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;

    runtime.events().subscribe("a.b", handle.clone()).await;
    runtime.events().subscribe("a.b", handle.clone()).await;
    assert_eq!(runtime.events().subscription_count().await, 1);

    assert_eq!(runtime.events().publish_named("a.b", json!({})).await, 1);
    assert_eq!(log.events().len(), 1);
}

#[tokio::test]
async fn distinct_patterns_deliver_once_each() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "probe",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;

    runtime.events().subscribe("a", handle.clone()).await;
    runtime.events().subscribe("a.b", handle.clone()).await;

    assert_eq!(runtime.events().publish_named("a.b", json!({})).await, 2);
    assert_eq!(log.events().len(), 2);
}

#[tokio::test]
async fn unsubscribe_removes_descendant_patterns() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "probe",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;
    runtime.events().subscribe("a.b", handle.clone()).await;

    runtime.events().unsubscribe("a", &handle).await;
    assert_eq!(runtime.events().subscription_count().await, 0);
    assert_eq!(runtime.events().publish_named("a.b", json!({})).await, 0);
}

#[tokio::test]
async fn unsubscribe_only_touches_the_given_handle() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log_a = EventLog::new();
    let log_b = EventLog::new();
    let first = register(
        &runtime,
        "probe.a",
        Box::new(RecordingExtension::new(Arc::clone(&log_a))),
    )
    .await;
    let second = register(
        &runtime,
        "probe.b",
        Box::new(RecordingExtension::new(Arc::clone(&log_b))),
    )
    .await;

    runtime.events().subscribe("a.b", first.clone()).await;
    runtime.events().subscribe("a.b", second.clone()).await;
    runtime.events().unsubscribe("a", &first).await;

    assert_eq!(runtime.events().publish_named("a.b", json!({})).await, 1);
    assert!(log_a.events().is_empty());
    assert_eq!(log_b.events().len(), 1);
}

#[tokio::test]
async fn a_failing_subscriber_does_not_block_the_rest() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let failing = register(&runtime, "broken", Box::new(FailingExtension::in_handler())).await;
    let working = register(
        &runtime,
        "probe",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;

    // Failing subscriber sits first in subscription order.
    runtime.events().subscribe("alerts", failing.clone()).await;
    runtime.events().subscribe("alerts", working.clone()).await;

    let delivered = runtime.events().publish_named("alerts.disk", json!({})).await;
    assert_eq!(delivered, 1);
    assert_eq!(log.names(), vec!["alerts.disk"]);
}

/// Subscribes another handle to "alerts" from inside its own handler.
struct ChainSubscriber {
    context: Mutex<Option<ExtensionContext>>,
    late: Mutex<Option<ExtensionHandle>>,
}

impl ChainSubscriber {
    fn new(late: ExtensionHandle) -> Self {
        Self {
            context: Mutex::new(None),
            late: Mutex::new(Some(late)),
        }
    }
}

#[async_trait::async_trait]
impl Extension for ChainSubscriber {
    async fn on_load(&mut self, ctx: &ExtensionContext) -> ExtResult<()> {
        *self.context.lock().unwrap() = Some(ctx.clone());
        Ok(())
    }

    async fn handle_event(&self, _event: &Event) -> ExtResult<()> {
        let context = self.context.lock().unwrap().clone();
        let late = self.late.lock().unwrap().take();
        if let (Some(context), Some(late)) = (context, late) {
            context.events().subscribe("alerts", late).await;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[tokio::test]
async fn a_subscriber_added_during_dispatch_misses_the_inflight_event() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let late_log = EventLog::new();
    let late = register(
        &runtime,
        "late",
        Box::new(RecordingExtension::new(Arc::clone(&late_log))),
    )
    .await;
    let chainer = register(&runtime, "chainer", Box::new(ChainSubscriber::new(late))).await;

    chainer.load().await.expect("load");
    runtime.events().subscribe("alerts", chainer.clone()).await;

    // The chainer's handler adds `late` mid-dispatch; the in-flight event
    // was published against the snapshot and must not reach it.
    assert_eq!(runtime.events().publish_named("alerts.disk", json!(1)).await, 1);
    assert!(late_log.events().is_empty());
    assert_eq!(runtime.events().subscription_count().await, 2);

    // The next publish fans out to both.
    assert_eq!(runtime.events().publish_named("alerts.disk", json!(2)).await, 2);
    assert_eq!(late_log.names(), vec!["alerts.disk"]);
}

#[tokio::test]
async fn payload_arrives_intact_before_publish_returns() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "chat",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;
    runtime.events().subscribe("network.message", handle.clone()).await;

    let payload = json!({ "author": "alice", "text": "hi" });
    let delivered = runtime
        .events()
        .publish_named("network.message.received", payload.clone())
        .await;

    assert_eq!(delivered, 1);
    let events = log.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "network.message.received");
    assert_eq!(events[0].payload, payload);
}

#[tokio::test]
async fn extensions_subscribe_through_their_context_at_load() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "chat",
        Box::new(RecordingExtension::subscribed(Arc::clone(&log), "chat")),
    )
    .await;

    handle.load().await.expect("load");
    assert_eq!(runtime.events().subscription_count().await, 1);
    assert_eq!(runtime.events().publish_named("chat.message", json!("hi")).await, 1);
    assert_eq!(log.names(), vec!["chat.message"]);
}

#[tokio::test]
async fn publish_from_stamps_the_source() {
    init_tracing();
    let runtime = Runtime::new(AppConfig::default());
    let log = EventLog::new();
    let handle = register(
        &runtime,
        "probe",
        Box::new(RecordingExtension::new(Arc::clone(&log))),
    )
    .await;
    runtime.events().subscribe("a", handle.clone()).await;

    runtime
        .events()
        .publish_from("a.b", json!({}), "network.tcp")
        .await;

    assert_eq!(log.events()[0].metadata.source, "network.tcp");
}
