// Awskeyring — Master Key Provider
//
// The credential database is encrypted with a key derived from a random master
// secret kept in the platform's native keyring. The master secret never
// appears in logs or debug output and is zeroized when dropped.
//
// Flow:
//   1. `get_or_create_master_secret()` reads the keyring entry, creating it on first use
//   2. `derive_db_key()` stretches it with Argon2id into a 32-byte SQLCipher key
//   3. `derive_db_key_hex()` renders that key for `PRAGMA key`

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::EnclaveError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Default keyring service name for this crate's entries.
pub const DEFAULT_KEYRING_SERVICE: &str = "awskeyring";

/// Keyring user under which the master secret is stored.
const KEYRING_USER: &str = "database-key";

/// Length of the randomly generated master secret in bytes (256-bit entropy).
const MASTER_SECRET_LEN: usize = 32;

/// Length of the derived database key in bytes (256-bit for AES-256).
const DERIVED_KEY_LEN: usize = 32;

// Argon2id: m=64 MiB, t=3, p=4
const ARGON2_M_COST: u32 = 65536;
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Where the master secret lives. Implemented by the OS keyring and, in tests,
/// by an in-memory mock.
pub trait MasterKeyProvider {
    /// Retrieve the master secret, generating and storing one on first run.
    fn get_or_create_master_secret(&self) -> Result<Zeroizing<Vec<u8>>, EnclaveError>;

    /// Salt for key derivation; stable per installation.
    fn salt(&self) -> Vec<u8>;

    /// Derive the SQLCipher encryption key from the master secret using Argon2id.
    fn derive_db_key(&self, master_secret: &[u8]) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
        derive_key(master_secret, &self.salt())
    }

    /// The derived key as lowercase hex.
    fn derive_db_key_hex(&self, master_secret: &[u8]) -> Result<Zeroizing<String>, EnclaveError> {
        let key = self.derive_db_key(master_secret)?;
        Ok(Zeroizing::new(key.iter().map(|b| format!("{:02x}", b)).collect()))
    }
}

/// Salt = SHA-256(service || "::" || user), so one master secret always
/// derives the same key for a given installation.
fn build_salt(service: &str, user: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(service.as_bytes());
    hasher.update(b"::");
    hasher.update(user.as_bytes());
    hasher.finalize().to_vec()
}

fn derive_key(master_secret: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(DERIVED_KEY_LEN))
        .map_err(|e| EnclaveError::Derivation(format!("invalid Argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut derived_key = Zeroizing::new(vec![0u8; DERIVED_KEY_LEN]);
    argon2
        .hash_password_into(master_secret, salt, &mut derived_key)
        .map_err(|e| EnclaveError::Derivation(format!("Argon2id hash failed: {}", e)))?;
    Ok(derived_key)
}

fn generate_master_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0u8; MASTER_SECRET_LEN]);
    rand::rng().fill_bytes(&mut secret);
    secret
}

// ─── Platform Implementation ─────────────────────────────────────────────────

/// Keyring-backed provider. Dispatches to the macOS Keychain, the Windows
/// Credential Manager, or the Linux kernel keyring.
pub struct KeyringProvider {
    service: String,
}

impl KeyringProvider {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, EnclaveError> {
        keyring::Entry::new(&self.service, KEYRING_USER)
            .map_err(|e| EnclaveError::Keyring(format!("failed to open keyring entry: {}", e)))
    }
}

impl Default for KeyringProvider {
    fn default() -> Self {
        Self::new(DEFAULT_KEYRING_SERVICE)
    }
}

impl MasterKeyProvider for KeyringProvider {
    fn get_or_create_master_secret(&self) -> Result<Zeroizing<Vec<u8>>, EnclaveError> {
        let entry = self.entry()?;

        match entry.get_secret() {
            Ok(secret) => {
                tracing::debug!(service = %self.service, "Retrieved master secret from keyring");
                Ok(Zeroizing::new(secret))
            }
            Err(keyring::Error::NoEntry) => {
                tracing::info!(service = %self.service, "No master secret found, generating a new one");
                let secret = generate_master_secret();
                entry.set_secret(&secret).map_err(|e| {
                    EnclaveError::Keyring(format!("failed to store master secret: {}", e))
                })?;
                Ok(secret)
            }
            Err(e) => Err(EnclaveError::Keyring(format!(
                "failed to retrieve master secret: {}",
                e
            ))),
        }
    }

    fn salt(&self) -> Vec<u8> {
        build_salt(&self.service, KEYRING_USER)
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────


// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::mock::MockKeyProvider;
    use super::*;

    #[test]
    fn test_master_secret_is_stable_once_created() {
        let provider = MockKeyProvider::new();
        let first = provider.get_or_create_master_secret().unwrap();
        let second = provider.get_or_create_master_secret().unwrap();
        assert_eq!(first.len(), MASTER_SECRET_LEN);
        assert_eq!(
            first.as_slice(),
            second.as_slice(),
            "Subsequent calls must return the same master secret"
        );
    }

    #[test]
    fn test_derivation_is_deterministic_and_hex_encoded() {
        let provider = MockKeyProvider::with_secret(vec![42u8; MASTER_SECRET_LEN]);
        let master = provider.get_or_create_master_secret().unwrap();

        let hex1 = provider.derive_db_key_hex(&master).unwrap();
        let hex2 = provider.derive_db_key_hex(&master).unwrap();
        assert_eq!(hex1.as_str(), hex2.as_str());
        assert_eq!(hex1.len(), DERIVED_KEY_LEN * 2);
        assert!(hex1.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_secrets_produce_different_keys() {
        let a = MockKeyProvider::with_secret(vec![1u8; MASTER_SECRET_LEN]);
        let b = MockKeyProvider::with_secret(vec![2u8; MASTER_SECRET_LEN]);

        let key_a = a.derive_db_key(&a.get_or_create_master_secret().unwrap()).unwrap();
        let key_b = b.derive_db_key(&b.get_or_create_master_secret().unwrap()).unwrap();
        assert_ne!(key_a.as_slice(), key_b.as_slice());
    }

    #[test]
    fn test_salt_depends_on_service() {
        let a = KeyringProvider::new("awskeyring");
        let b = KeyringProvider::new("awskeyring-work");
        assert_ne!(a.salt(), b.salt());
        assert_eq!(a.salt(), KeyringProvider::default().salt());
    }
}
