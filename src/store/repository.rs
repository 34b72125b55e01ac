// Awskeyring — Secret Store
//
// Label-addressed CRUD over accounts, roles and session pairs on top of any
// `SecretStoreBackend`. Every entity is validated before it is written, so a
// rejected input never mutates the store. Values handed out are copies;
// changing them has no effect until written back.

use std::vec;

use super::backend::SecretStoreBackend;
use super::models::{
    AccountCredential, Entity, EntryKind, Kind, Record, RoleReference, SessionPair, Update,
};
use super::StoreError;

pub struct SecretStore<B> {
    backend: B,
}

impl<B: SecretStoreBackend> SecretStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ─── Create ──────────────────────────────────────────────────────────────

    /// Persist a new entity. Fails with `DuplicateLabel` if the label is taken
    /// for that kind.
    pub fn add(&self, entity: impl Into<Entity>) -> Result<(), StoreError> {
        let entity = entity.into();
        entity.validate()?;

        if self.exists(entity.kind(), entity.label())? {
            return Err(StoreError::DuplicateLabel {
                kind: entity.kind(),
                label: entity.label().to_string(),
            });
        }

        self.backend.save_all(&entity.to_records())?;
        tracing::info!(kind = %entity.kind(), label = %entity.label(), "Entity added");
        Ok(())
    }

    /// Persist an entity, overwriting any existing one with the same label.
    pub fn replace(&self, entity: impl Into<Entity>) -> Result<(), StoreError> {
        let entity = entity.into();
        entity.validate()?;

        self.backend.save_all(&entity.to_records())?;
        tracing::info!(kind = %entity.kind(), label = %entity.label(), "Entity replaced");
        Ok(())
    }

    // ─── Read ────────────────────────────────────────────────────────────────

    /// Look up an entity. Absence is `Ok(None)`, never an error.
    ///
    /// Session pairs are returned as stored, expired or not; callers that
    /// must never see a stale pair go through `SessionManager`.
    pub fn get(&self, kind: Kind, label: &str) -> Result<Option<Entity>, StoreError> {
        let entity = match kind {
            Kind::Account => self.get_account(label)?.map(Entity::Account),
            Kind::Role => self.get_role(label)?.map(Entity::Role),
            Kind::Session => self.get_session(label)?.map(Entity::Session),
        };
        Ok(entity)
    }

    pub fn get_account(&self, label: &str) -> Result<Option<AccountCredential>, StoreError> {
        let record = self.backend.find(EntryKind::Account, label)?;
        Ok(record.map(AccountCredential::from_record))
    }

    pub fn get_role(&self, label: &str) -> Result<Option<RoleReference>, StoreError> {
        let record = self.backend.find(EntryKind::Role, label)?;
        Ok(record.map(RoleReference::from_record))
    }

    /// A session pair whose halves are missing or do not correlate reads as absent.
    pub fn get_session(&self, label: &str) -> Result<Option<SessionPair>, StoreError> {
        let key = self.backend.find(EntryKind::SessionKey, label)?;
        let token = self.backend.find(EntryKind::SessionToken, label)?;

        match (key, token) {
            (Some(key), Some(token)) => Ok(assemble_pair(key, token)),
            (None, None) => Ok(None),
            _ => {
                tracing::warn!(label = %label, "Ignoring half-written session pair");
                Ok(None)
            }
        }
    }

    // ─── Update ──────────────────────────────────────────────────────────────

    /// Overwrite all or part of a stored entity. Fails with `NotFound` if the
    /// label is absent. Account changes are a single record write, so the
    /// key, secret and timestamp always change together.
    pub fn update(&self, label: &str, update: Update) -> Result<(), StoreError> {
        let kind = update.kind();
        let not_found = || StoreError::NotFound {
            kind,
            label: label.to_string(),
        };

        let updated: Entity = match update {
            Update::Account(fields) => {
                let mut account = self.get_account(label)?.ok_or_else(not_found)?;
                fields.apply(&mut account);
                account.into()
            }
            Update::Role { role_arn } => {
                let mut role = self.get_role(label)?.ok_or_else(not_found)?;
                role.role_arn = role_arn;
                role.into()
            }
            Update::Session(mut pair) => {
                if !self.exists(Kind::Session, label)? {
                    return Err(not_found());
                }
                pair.label = label.to_string();
                pair.into()
            }
        };

        updated.validate()?;
        self.backend.save_all(&updated.to_records())?;
        tracing::info!(kind = %kind, label = %label, "Entity updated");
        Ok(())
    }

    // ─── Delete ──────────────────────────────────────────────────────────────

    /// Idempotent delete. Returns whether anything was removed.
    pub fn remove(&self, kind: Kind, label: &str) -> Result<bool, StoreError> {
        let removed = match kind {
            Kind::Account => self.backend.delete(EntryKind::Account, label)?,
            Kind::Role => self.backend.delete(EntryKind::Role, label)?,
            Kind::Session => {
                self.backend.delete_all(&[
                    (EntryKind::SessionKey, label),
                    (EntryKind::SessionToken, label),
                ])? > 0
            }
        };

        if removed {
            tracing::info!(kind = %kind, label = %label, "Entity removed");
        }
        Ok(removed)
    }

    // ─── List ────────────────────────────────────────────────────────────────

    /// Entities of `kind` ordered by label. Each call re-reads the backend.
    pub fn list(&self, kind: Kind) -> Result<Entities<'_, B>, StoreError> {
        let physical = match kind {
            Kind::Account => EntryKind::Account,
            Kind::Role => EntryKind::Role,
            Kind::Session => EntryKind::SessionKey,
        };
        Ok(Entities {
            store: self,
            records: self.backend.enumerate(physical)?.into_iter(),
        })
    }

    /// Labels whose session pair is unusable: one half is missing, or both
    /// halves exist but do not belong together.
    pub(crate) fn incomplete_sessions(&self) -> Result<Vec<String>, StoreError> {
        let mut incomplete = Vec::new();
        for key in self.backend.enumerate(EntryKind::SessionKey)? {
            match self.backend.find(EntryKind::SessionToken, &key.label)? {
                None => incomplete.push(key.label),
                Some(token) => {
                    let label = key.label.clone();
                    if SessionPair::from_records(key, token).is_err() {
                        incomplete.push(label);
                    }
                }
            }
        }
        for token in self.backend.enumerate(EntryKind::SessionToken)? {
            if self.backend.find(EntryKind::SessionKey, &token.label)?.is_none() {
                incomplete.push(token.label);
            }
        }
        Ok(incomplete)
    }

    fn exists(&self, kind: Kind, label: &str) -> Result<bool, StoreError> {
        let found = match kind {
            Kind::Account => self.backend.find(EntryKind::Account, label)?.is_some(),
            Kind::Role => self.backend.find(EntryKind::Role, label)?.is_some(),
            Kind::Session => {
                self.backend.find(EntryKind::SessionKey, label)?.is_some()
                    || self.backend.find(EntryKind::SessionToken, label)?.is_some()
            }
        };
        Ok(found)
    }
}

fn assemble_pair(key: Record, token: Record) -> Option<SessionPair> {
    let label = key.label.clone();
    match SessionPair::from_records(key, token) {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!(label = %label, error = %e, "Ignoring unusable session pair");
            None
        }
    }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Lazy iterator returned by `SecretStore::list`. Session pairs are joined
/// with their token record as they are reached; incomplete pairs are skipped.
pub struct Entities<'a, B> {
    store: &'a SecretStore<B>,
    records: vec::IntoIter<Record>,
}

impl<B: SecretStoreBackend> Iterator for Entities<'_, B> {
    type Item = Result<Entity, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.records.next()?;
            match record.kind {
                EntryKind::Account => return Some(Ok(AccountCredential::from_record(record).into())),
                EntryKind::Role => return Some(Ok(RoleReference::from_record(record).into())),
                EntryKind::SessionKey => {
                    let token = match self.store.backend.find(EntryKind::SessionToken, &record.label) {
                        Ok(token) => token,
                        Err(e) => return Some(Err(e)),
                    };
                    match token.and_then(|token| assemble_pair(record, token)) {
                        Some(pair) => return Some(Ok(pair.into())),
                        None => continue,
                    }
                }
                EntryKind::SessionToken => continue,
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
