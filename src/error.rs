use thiserror::Error;

/// Unified error type for version-reconcile operations
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience type alias for Results in version-reconcile
pub type Result<T> = std::result::Result<T, ReconcileError>;

impl ReconcileError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReconcileError::Config(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReconcileError::Manifest(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReconcileError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReconcileError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ReconcileError::Remote(msg.into())
    }

    /// Create a credential error with context
    pub fn credential(msg: impl Into<String>) -> Self {
        ReconcileError::Credential(msg.into())
    }
}
