// Awskeyring — Store error types

use thiserror::Error;

use super::Kind;
use crate::enclave::EnclaveError;
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Enclave error: {0}")]
    Enclave(#[from] EnclaveError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No {kind} named {label}")]
    NotFound { kind: Kind, label: String },

    #[error("A {kind} named {label} already exists")]
    DuplicateLabel { kind: Kind, label: String },

    #[error("Corrupt entry: {0}")]
    Corrupt(String),

    #[error("Invalid database key: database may be corrupted or key is wrong")]
    InvalidKey,

    #[error("Backend error: {0}")]
    Backend(String),
}
