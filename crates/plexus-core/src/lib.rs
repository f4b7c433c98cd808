//! In-process extension runtime.
//!
//! Extensions are discovered from declarative configuration,
//! instantiated through a named-constructor catalog, wrapped with a
//! uniform lifecycle contract (load / kill / status), indexed for lookup
//! by capability and by concrete identity, and wired together through a
//! publish/subscribe bus with hierarchical event names.
//!
//! # Overview
//!
//! ```text
//! ConfigStore ──> ExtensionCatalog ──> ExtensionHost ──> ExtensionRegistry
//!      (records)      (constructors)      (lifecycle)       (lookup)
//!                                                              │
//!                          EventBus <── subscribe/publish ─────┘
//! ```
//!
//! [`Runtime::bootstrap`](crate::runtime::Runtime::bootstrap) drives the
//! startup sequence; afterwards the registry and the bus are shared,
//! concurrently accessed resources and every extension interacts with
//! them through its [`ExtensionContext`](crate::extension::ExtensionContext).

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod extension;
pub mod host;
pub mod registry;
pub mod runtime;

pub use catalog::{ExtensionCatalog, ExtensionConstructor};
pub use config::{AppConfig, ConfigStore, ExtensionConfig};
pub use error::{ExtResult, ExtensionError, Result, RuntimeError};
pub use event::{Event, EventMetadata, name_matches};
pub use eventbus::EventBus;
pub use extension::{
    DynExtension, Extension, ExtensionContext, ExtensionDescriptor, ExtensionStatus,
};
pub use host::{ExtensionHandle, ExtensionHost};
pub use registry::ExtensionRegistry;
pub use runtime::{Runtime, SharedRuntime};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::catalog::ExtensionCatalog;
    pub use crate::config::{AppConfig, ConfigStore, ExtensionConfig};
    pub use crate::error::{ExtResult, ExtensionError, Result, RuntimeError};
    pub use crate::event::{Event, EventMetadata};
    pub use crate::eventbus::EventBus;
    pub use crate::extension::{
        Extension, ExtensionContext, ExtensionDescriptor, ExtensionStatus,
    };
    pub use crate::host::{ExtensionHandle, ExtensionHost};
    pub use crate::registry::ExtensionRegistry;
    pub use crate::runtime::{Runtime, SharedRuntime};
}
