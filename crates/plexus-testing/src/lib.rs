//! Testing utilities for the plexus extension runtime.
//!
//! This crate provides:
//! - Instrumented extension doubles (recording, failing, permanent)
//! - Fixture helpers materializing configuration trees on disk
//! - One-shot tracing initialization for tests

pub mod doubles;
pub mod fixtures;

pub use doubles::{EventLog, FailingExtension, PermanentExtension, RecordingExtension};
pub use fixtures::write_config_tree;

use once_cell::sync::OnceCell;

static TRACING: OnceCell<()> = OnceCell::new();

/// Install a tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `plexus=debug`.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plexus=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
