// Awskeyring — Session Manager
//
// Mediates every read of a session pair. Each read first evicts pairs whose
// expiration has been reached, so a caller never observes a stale pair. There
// is no background sweeper: stale pairs stay in storage until the next read.

use chrono::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::clock::{Clock, SystemClock};
use crate::remote::{FederationService, Principal, RemoteError, SessionRequest};
use crate::store::{Kind, SecretStore, SecretStoreBackend, SessionPair, StoreError};
use crate::validate::{self, ValidationError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Federation call failed: {0}")]
    Remote(#[from] RemoteError),
}

/// How to mint a new session when none is cached.
#[derive(Clone)]
pub struct SessionOptions {
    /// Label of a stored role to assume.
    pub role: Option<String>,
    /// One-time code for the account's MFA device.
    pub mfa_code: Option<Zeroizing<String>>,
    pub duration: Duration,
}

impl SessionOptions {
    pub fn new(duration: Duration) -> Self {
        Self {
            role: None,
            mfa_code: None,
            duration,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_mfa_code(mut self, code: impl Into<String>) -> Self {
        self.mfa_code = Some(Zeroizing::new(code.into()));
        self
    }
}

pub struct SessionManager<'a, B, C = SystemClock> {
    store: &'a SecretStore<B>,
    clock: C,
}

impl<'a, B: SecretStoreBackend> SessionManager<'a, B> {
    pub fn new(store: &'a SecretStore<B>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<'a, B: SecretStoreBackend, C: Clock> SessionManager<'a, B, C> {
    pub fn with_clock(store: &'a SecretStore<B>, clock: C) -> Self {
        Self { store, clock }
    }

    /// The live pair for `label`, after evicting everything expired.
    pub fn get_pair(&self, label: &str) -> Result<Option<SessionPair>, StoreError> {
        self.evict_expired()?;
        self.store.get_session(label)
    }

    /// Remove every pair with `expiration <= now`, along with any half-written
    /// pair. Returns the number of complete pairs evicted.
    pub fn evict_expired(&self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let mut evicted = 0;

        for entity in self.store.list(Kind::Session)? {
            let Some(pair) = entity?.into_session() else {
                continue;
            };
            if pair.is_expired_at(now) && self.store.remove(Kind::Session, &pair.label)? {
                tracing::info!(label = %pair.label, expiration = %pair.expiration, "Evicted expired session");
                evicted += 1;
            }
        }

        for label in self.store.incomplete_sessions()? {
            if self.store.remove(Kind::Session, &label)? {
                tracing::warn!(label = %label, "Removed half-written session pair");
            }
        }

        Ok(evicted)
    }

    /// Persist a pair, replacing any pair already held under its label.
    pub fn store_pair(&self, pair: SessionPair) -> Result<(), StoreError> {
        self.store.replace(pair)
    }

    pub fn remove_pair(&self, label: &str) -> Result<bool, StoreError> {
        self.store.remove(Kind::Session, label)
    }

    /// Return the cached pair for `label`, or federate a new one from the
    /// stored account and cache it.
    pub fn obtain<F: FederationService + ?Sized>(
        &self,
        label: &str,
        federation: &F,
        options: &SessionOptions,
    ) -> Result<SessionPair, SessionError> {
        if let Some(pair) = self.get_pair(label)? {
            tracing::debug!(label = %label, "Using cached session");
            return Ok(pair);
        }

        validate::validate_session_duration(options.duration.num_seconds())?;

        let account = self
            .store
            .get_account(label)?
            .ok_or_else(|| StoreError::NotFound {
                kind: Kind::Account,
                label: label.to_string(),
            })?;

        let role_arn = match &options.role {
            Some(role) => {
                let role = self.store.get_role(role)?.ok_or_else(|| StoreError::NotFound {
                    kind: Kind::Role,
                    label: role.clone(),
                })?;
                Some(role.role_arn)
            }
            None => None,
        };

        let mfa = match &options.mfa_code {
            Some(code) => {
                let serial = account.mfa_arn.clone().ok_or(ValidationError::MfaArn)?;
                Some((serial, code.clone()))
            }
            None => None,
        };

        let request = SessionRequest {
            name: label.to_string(),
            role_arn,
            mfa,
            duration: options.duration,
        };

        let issued = federation.issue_session(&Principal::from(&account), &request)?;
        let pair = SessionPair::new(
            label,
            issued.access_key_id.clone(),
            issued.secret_access_key(),
            issued.session_token(),
            issued.expiration,
        );

        self.store_pair(pair.clone())?;
        tracing::info!(label = %label, expiration = %pair.expiration, assumed_role = request.role_arn.is_some(), "Stored new session");
        Ok(pair)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
