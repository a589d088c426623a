use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by clients in this crate.
///
/// `Error` is `Clone` so a single injected error can be handed back on every
/// call that matches its rule.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Resource not found: {kind} {name} in namespace {namespace}")]
    NotFound {
        kind: String,
        name: String,
        namespace: String,
    },

    #[error("Resource already exists: {kind} {name} in namespace {namespace}")]
    AlreadyExists {
        kind: String,
        name: String,
        namespace: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{kind} \"{name}\" is invalid: {message}")]
    Invalid {
        kind: String,
        name: String,
        message: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(Arc<serde_json::Error>),

    #[error("JSON patch error: {0}")]
    PatchError(Arc<json_patch::PatchError>),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Failed to access object metadata: {0}")]
    MetadataError(String),

    #[error("Resource type not registered in scheme: {group}/{version}, Kind={kind}")]
    NotRegistered {
        group: String,
        version: String,
        kind: String,
    },

    #[error("Invalid action: {0:?}")]
    InvalidAction(String),

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    #[error("{0}")]
    Injected(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary error so it can be registered with an injector.
    pub fn injected<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Injected(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(Arc::new(err))
    }
}

impl From<json_patch::PatchError> for Error {
    fn from(err: json_patch::PatchError) -> Self {
        Error::PatchError(Arc::new(err))
    }
}
