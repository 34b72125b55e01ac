// Awskeyring — Top-level error types
//
// Aggregates errors from every module into a single error enum for the
// library boundary.

use thiserror::Error;

/// Top-level error type for all awskeyring operations.
#[derive(Debug, Error)]
pub enum AwskeyringError {
    #[error("Enclave error: {0}")]
    Enclave(#[from] crate::enclave::EnclaveError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error(transparent)]
    Validation(#[from] crate::validate::ValidationError),

    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),

    #[error(transparent)]
    Rotation(#[from] crate::rotation::RotationError),

    #[error("Remote error: {0}")]
    Remote(#[from] crate::remote::RemoteError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AwskeyringError>;
