//! Error types for the extension runtime.
//!
//! Two layers of errors exist: `ExtensionError` is what extension code
//! (constructors, lifecycle hooks, event handlers) reports back to the
//! runtime, and `RuntimeError` is what the runtime reports to its callers.

/// Errors raised by extension code itself.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    /// A lifecycle hook or event handler failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The extension rejected its configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error inside extension code.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error inside extension code.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Result type for extension-authored code.
pub type ExtResult<T> = std::result::Result<T, ExtensionError>;

/// Errors raised by the runtime itself.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Two extensions were configured with the same capability and identity.
    #[error("extension already registered: {capability}/{identity}")]
    DuplicateRegistration {
        capability: String,
        identity: String,
    },

    /// A capability was queried that no configured extension declares.
    /// The registry is populated only from configuration, so this is a
    /// configuration error, not an empty result.
    #[error("no \"{0}\" extensions are configured in this application")]
    UnknownCapability(String),

    /// No constructor is known for the given identity.
    #[error("no constructor registered for identity: {0}")]
    UnknownIdentity(String),

    /// A constructor was registered twice under the same identity.
    #[error("constructor already registered for identity: {0}")]
    DuplicateConstructor(String),

    /// Extension initialization (or construction) failed.
    #[error("load failed for {identity}: {reason}")]
    LoadFailed { identity: String, reason: String },

    /// Extension teardown failed.
    #[error("kill failed for {identity}: {reason}")]
    KillFailed { identity: String, reason: String },

    /// Kill was attempted against the extension's declared policy.
    #[error("extension is not killable: {0}")]
    NotKillable(String),

    /// A lifecycle operation was invoked on a host that was never
    /// registered with a runtime.
    #[error("extension host is not bound to a runtime: {0}")]
    Unbound(String),

    /// IO error reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
