// Awskeyring — Store Module
//
// Persistence for the three entity kinds. `SecretStore` is generic over a
// `SecretStoreBackend`: an in-memory map, or a SQLCipher database keyed from
// the OS keyring.

mod backend;
mod db;
mod error;
mod models;
mod repository;

pub use backend::{MemoryBackend, SecretStoreBackend};
pub use db::Database;
pub use error::StoreError;
pub use models::{
    AccountCredential, AccountUpdate, Attributes, Entity, EntryKind, Kind, Record, RoleReference,
    SessionPair, Update,
};
pub use repository::{Entities, SecretStore};

#[cfg(test)]
pub(crate) use backend::failing;
