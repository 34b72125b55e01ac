// Awskeyring — Enclave Module
//
// Keeps the master secret in the OS keyring (Keychain/Credential Manager/
// kernel keyring) and derives the credential database key from it.

mod error;
mod provider;

pub use error::EnclaveError;
pub use provider::{KeyringProvider, MasterKeyProvider, DEFAULT_KEYRING_SERVICE};

#[cfg(test)]
pub(crate) use provider::mock;
