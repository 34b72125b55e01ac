// Awskeyring — Remote service boundary
//
// The identity service (key inventory, creation, deletion) and the federation
// service (temporary sessions) are consumed through these traits. Concrete
// API clients live outside this crate; calls are synchronous and may fail.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::store::AccountCredential;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failed call to a remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Service(String),
}

// ─── Principal ───────────────────────────────────────────────────────────────

/// The identity a remote call is made as, derived from a stored account.
#[derive(Clone)]
pub struct Principal {
    pub access_key_id: String,
    secret: Zeroizing<String>,
    pub mfa_arn: Option<String>,
}

impl Principal {
    pub fn new(access_key_id: impl Into<String>, secret: impl Into<String>, mfa_arn: Option<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret: Zeroizing::new(secret.into()),
            mfa_arn,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl From<&AccountCredential> for Principal {
    fn from(credential: &AccountCredential) -> Self {
        Self::new(
            credential.account.clone(),
            credential.secret(),
            credential.mfa_arn.clone(),
        )
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("access_key_id", &self.access_key_id)
            .field("secret", &"[REDACTED]")
            .field("mfa_arn", &self.mfa_arn)
            .finish()
    }
}

// ─── Key service ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Active,
    Inactive,
}

/// One access key as listed by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: KeyStatus,
}

/// A key pair freshly issued by the identity service.
#[derive(Clone)]
pub struct IssuedKey {
    pub id: String,
    secret: Zeroizing<String>,
    pub created_at: DateTime<Utc>,
}

impl IssuedKey {
    pub fn new(id: impl Into<String>, secret: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            secret: Zeroizing::new(secret.into()),
            created_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for IssuedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedKey")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Access key management for the identity a `Principal` authenticates as.
pub trait RemoteKeyService {
    fn list_keys(&self, user: &Principal) -> Result<Vec<AccessKeyMetadata>, RemoteError>;

    fn create_key(&self, user: &Principal) -> Result<IssuedKey, RemoteError>;

    fn delete_key(&self, user: &Principal, key_id: &str) -> Result<(), RemoteError>;
}

// ─── Federation service ──────────────────────────────────────────────────────

/// What kind of temporary session to ask for.
#[derive(Clone)]
pub struct SessionRequest {
    /// Session name, normally the account label.
    pub name: String,
    /// Role to assume; a plain federated session when absent.
    pub role_arn: Option<String>,
    /// MFA device serial and one-time code.
    pub mfa: Option<(String, Zeroizing<String>)>,
    pub duration: Duration,
}

impl fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRequest")
            .field("name", &self.name)
            .field("role_arn", &self.role_arn)
            .field("mfa", &self.mfa.as_ref().map(|(serial, _)| serial))
            .field("duration", &self.duration)
            .finish()
    }
}

/// Temporary credentials issued by the federation service.
#[derive(Clone)]
pub struct IssuedSession {
    pub access_key_id: String,
    secret_access_key: Zeroizing<String>,
    session_token: Zeroizing<String>,
    pub expiration: DateTime<Utc>,
}

impl IssuedSession {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: Zeroizing::new(secret_access_key.into()),
            session_token: Zeroizing::new(session_token.into()),
            expiration,
        }
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Exchanges a long-lived credential for a temporary session.
pub trait FederationService {
    fn issue_session(&self, user: &Principal, request: &SessionRequest) -> Result<IssuedSession, RemoteError>;
}
