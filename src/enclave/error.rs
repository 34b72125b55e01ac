// Awskeyring — Enclave error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnclaveError {
    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Key derivation error: {0}")]
    Derivation(String),
}
