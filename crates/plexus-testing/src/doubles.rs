//! Instrumented extension doubles.

use plexus_core::error::{ExtResult, ExtensionError};
use plexus_core::event::Event;
use plexus_core::extension::{Extension, ExtensionContext};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared record of what a [`RecordingExtension`] observed.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
    loads: AtomicUsize,
    kills: AtomicUsize,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every event received, in delivery order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Names of every event received, in delivery order.
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// How many times `on_load` ran.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// How many times `on_kill` ran.
    pub fn kill_count(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    fn record_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Extension that records lifecycle and event activity into an
/// [`EventLog`], optionally subscribing itself to a pattern at load.
pub struct RecordingExtension {
    log: Arc<EventLog>,
    subscribe_to: Option<String>,
    killable: bool,
}

impl RecordingExtension {
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            subscribe_to: None,
            killable: true,
        }
    }

    /// A recording extension that subscribes to `pattern` in `on_load`.
    pub fn subscribed(log: Arc<EventLog>, pattern: impl Into<String>) -> Self {
        Self {
            log,
            subscribe_to: Some(pattern.into()),
            killable: true,
        }
    }

    pub fn with_killable(mut self, killable: bool) -> Self {
        self.killable = killable;
        self
    }
}

#[async_trait::async_trait]
impl Extension for RecordingExtension {
    fn killable(&self) -> bool {
        self.killable
    }

    async fn on_load(&mut self, ctx: &ExtensionContext) -> ExtResult<()> {
        self.log.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(pattern) = &self.subscribe_to {
            ctx.events().subscribe(pattern.clone(), ctx.handle().clone()).await;
        }
        Ok(())
    }

    async fn on_kill(&mut self) -> ExtResult<()> {
        self.log.kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn handle_event(&self, event: &Event) -> ExtResult<()> {
        self.log.record_event(event);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Extension that fails on demand, for isolation tests.
#[derive(Default)]
pub struct FailingExtension {
    fail_load: bool,
    fail_kill: bool,
    fail_handler: bool,
}

impl FailingExtension {
    /// Fails its `on_load` hook.
    pub fn in_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    /// Fails its `on_kill` hook.
    pub fn in_kill() -> Self {
        Self {
            fail_kill: true,
            ..Self::default()
        }
    }

    /// Fails every `handle_event` call.
    pub fn in_handler() -> Self {
        Self {
            fail_handler: true,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl Extension for FailingExtension {
    async fn on_load(&mut self, _ctx: &ExtensionContext) -> ExtResult<()> {
        if self.fail_load {
            return Err(ExtensionError::ExecutionFailed("load refused".into()));
        }
        Ok(())
    }

    async fn on_kill(&mut self) -> ExtResult<()> {
        if self.fail_kill {
            return Err(ExtensionError::ExecutionFailed("kill refused".into()));
        }
        Ok(())
    }

    async fn handle_event(&self, _event: &Event) -> ExtResult<()> {
        if self.fail_handler {
            return Err(ExtensionError::ExecutionFailed("handler failed".into()));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Extension whose policy forbids kill.
#[derive(Default)]
pub struct PermanentExtension;

#[async_trait::async_trait]
impl Extension for PermanentExtension {
    fn killable(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
