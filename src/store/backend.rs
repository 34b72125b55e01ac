// Awskeyring — Secret storage backend
//
// The capability the store is built on: save, find, delete and enumerate
// labelled records with attributes. Single-record writes are assumed atomic.
// Batch writes are all-or-nothing; the default implementations get there by
// compensating, backends with transactions override them.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::models::{EntryKind, Record};
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

pub trait SecretStoreBackend {
    /// Insert or overwrite the record at `(record.kind, record.label)`.
    fn save(&self, record: &Record) -> Result<(), StoreError>;

    fn find(&self, kind: EntryKind, label: &str) -> Result<Option<Record>, StoreError>;

    /// Returns true if a record was removed.
    fn delete(&self, kind: EntryKind, label: &str) -> Result<bool, StoreError>;

    /// Every record of `kind`, ordered by label.
    fn enumerate(&self, kind: EntryKind) -> Result<Vec<Record>, StoreError>;

    /// Save every record or none of them.
    fn save_all(&self, records: &[Record]) -> Result<(), StoreError> {
        let mut previous: Vec<(EntryKind, &str, Option<Record>)> = Vec::with_capacity(records.len());

        for record in records {
            let before = self.find(record.kind, &record.label)?;
            match self.save(record) {
                Ok(()) => previous.push((record.kind, &record.label, before)),
                Err(e) => {
                    restore(self, previous);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Delete every listed record or none of them. Returns how many existed.
    fn delete_all(&self, keys: &[(EntryKind, &str)]) -> Result<usize, StoreError> {
        let mut removed: Vec<Record> = Vec::with_capacity(keys.len());

        for &(kind, label) in keys {
            let before = self.find(kind, label)?;
            match self.delete(kind, label) {
                Ok(_) => removed.extend(before),
                Err(e) => {
                    for record in &removed {
                        if let Err(undo) = self.save(record) {
                            tracing::warn!(kind = %record.kind, label = %record.label, error = %undo, "Failed to restore record after aborted delete");
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(removed.len())
    }
}

/// Undo the saves of an aborted batch, newest first.
fn restore<B: SecretStoreBackend + ?Sized>(backend: &B, previous: Vec<(EntryKind, &str, Option<Record>)>) {
    for (kind, label, before) in previous.into_iter().rev() {
        let undo = match before {
            Some(record) => backend.save(&record),
            None => backend.delete(kind, label).map(|_| ()),
        };
        if let Err(e) = undo {
            tracing::warn!(kind = %kind, label = %label, error = %e, "Failed to roll back record after aborted save");
        }
    }
}

// ─── In-Memory Backend ───────────────────────────────────────────────────────

/// A process-local backend. Nothing is persisted; intended for tests and
/// ephemeral use without touching the OS keyring.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<BTreeMap<(EntryKind, String), Record>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical records held, across all kinds.
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("memory backend lock poisoned".to_string())
}

impl SecretStoreBackend for MemoryBackend {
    fn save(&self, record: &Record) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.insert((record.kind, record.label.clone()), record.clone());
        Ok(())
    }

    fn find(&self, kind: EntryKind, label: &str) -> Result<Option<Record>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(&(kind, label.to_string())).cloned())
    }

    fn delete(&self, kind: EntryKind, label: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        Ok(records.remove(&(kind, label.to_string())).is_some())
    }

    fn enumerate(&self, kind: EntryKind) -> Result<Vec<Record>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod failing {
    use std::cell::Cell;

    use super::*;

    /// Wraps a backend and fails the n-th save or delete (1-based) it sees.
    pub struct FailingBackend<B> {
        pub inner: B,
        fail_save_at: Cell<Option<usize>>,
        fail_delete_at: Cell<Option<usize>>,
        saves: Cell<usize>,
        deletes: Cell<usize>,
    }

    impl<B> FailingBackend<B> {
        pub fn new(inner: B) -> Self {
            Self {
                inner,
                fail_save_at: Cell::new(None),
                fail_delete_at: Cell::new(None),
                saves: Cell::new(0),
                deletes: Cell::new(0),
            }
        }

        pub fn fail_save_at(self, n: usize) -> Self {
            self.fail_save_at.set(Some(self.saves.get() + n));
            self
        }

        pub fn fail_delete_at(self, n: usize) -> Self {
            self.fail_delete_at.set(Some(self.deletes.get() + n));
            self
        }

        /// Fail the next save from now on.
        pub fn fail_next_save(&self) {
            self.fail_save_at.set(Some(self.saves.get() + 1));
        }

        pub fn saves(&self) -> usize {
            self.saves.get()
        }
    }

    impl<B: SecretStoreBackend> SecretStoreBackend for FailingBackend<B> {
        fn save(&self, record: &Record) -> Result<(), StoreError> {
            let n = self.saves.get() + 1;
            self.saves.set(n);
            if self.fail_save_at.get() == Some(n) {
                return Err(StoreError::Backend("injected save failure".to_string()));
            }
            self.inner.save(record)
        }

        fn find(&self, kind: EntryKind, label: &str) -> Result<Option<Record>, StoreError> {
            self.inner.find(kind, label)
        }

        fn delete(&self, kind: EntryKind, label: &str) -> Result<bool, StoreError> {
            let n = self.deletes.get() + 1;
            self.deletes.set(n);
            if self.fail_delete_at.get() == Some(n) {
                return Err(StoreError::Backend("injected delete failure".to_string()));
            }
            self.inner.delete(kind, label)
        }

        fn enumerate(&self, kind: EntryKind) -> Result<Vec<Record>, StoreError> {
            self.inner.enumerate(kind)
        }
    }
}
