// Awskeyring — Library root
//
// Local credential manager for AWS-style access keys: validation, an
// encrypted store keyed from the OS keyring, expiring session pairs, and
// safe key rotation.

pub mod clock;
pub mod config;
pub mod enclave;
pub mod error;
pub mod remote;
pub mod rotation;
pub mod session;
pub mod store;
pub mod validate;

pub use config::Config;
pub use error::{AwskeyringError, Result};
pub use rotation::{RotationEngine, RotationPolicy, RotationReport};
pub use session::{SessionManager, SessionOptions};
pub use store::{AccountCredential, Kind, RoleReference, SecretStore, SessionPair};
