// Awskeyring — Stored entity models
//
// SECURITY: secret fields are private `Zeroizing` strings. They are never
// included in Debug output or log messages; access goes through explicit
// getter methods.
//
// Three logical kinds are stored. Accounts and roles map to one physical
// record each; a session pair maps to two records (key and token) that share
// a label.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::StoreError;
use crate::validate::{self, ValidationError};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The logical entity kinds understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Account,
    Role,
    Session,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Account => "account",
            Kind::Role => "role",
            Kind::Session => "session",
        })
    }
}

/// The physical record kinds persisted by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Account,
    Role,
    SessionKey,
    SessionToken,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Account => "account",
            EntryKind::Role => "role",
            EntryKind::SessionKey => "session-key",
            EntryKind::SessionToken => "session-token",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "account" => Some(EntryKind::Account),
            "role" => Some(EntryKind::Role),
            "session-key" => Some(EntryKind::SessionKey),
            "session-token" => Some(EntryKind::SessionToken),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Physical record ─────────────────────────────────────────────────────────

/// Non-secret attributes stored next to a record's secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Access key id for keys, role ARN for roles.
    pub account: String,
    /// MFA device ARN for accounts.
    pub comment: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// One physical entry as exchanged with a `SecretStoreBackend`.
#[derive(Clone)]
pub struct Record {
    pub kind: EntryKind,
    pub label: String,
    pub attributes: Attributes,
    secret: Zeroizing<String>,
}

impl Record {
    pub fn new(kind: EntryKind, label: impl Into<String>, attributes: Attributes, secret: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            attributes,
            secret: Zeroizing::new(secret.into()),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("attributes", &self.attributes)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// A long-lived access key pair.
#[derive(Clone)]
pub struct AccountCredential {
    pub label: String,
    /// The access key id.
    pub account: String,
    secret: Zeroizing<String>,
    pub mfa_arn: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AccountCredential {
    pub fn new(
        label: impl Into<String>,
        account: impl Into<String>,
        secret: impl Into<String>,
        mfa_arn: Option<String>,
    ) -> Self {
        Self {
            label: label.into(),
            account: account.into(),
            secret: Zeroizing::new(secret.into()),
            mfa_arn,
            updated_at: None,
        }
    }

    /// The secret access key.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = Zeroizing::new(secret.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_label(&self.label)?;
        validate::validate_access_key(&self.account)?;
        validate::validate_secret(&self.secret)?;
        if let Some(mfa) = &self.mfa_arn {
            validate::validate_mfa_arn(mfa)?;
        }
        Ok(())
    }

    pub(crate) fn to_record(&self) -> Record {
        Record::new(
            EntryKind::Account,
            self.label.clone(),
            Attributes {
                account: self.account.clone(),
                comment: self.mfa_arn.clone(),
                updated_at: self.updated_at,
                expires_at: None,
            },
            self.secret.as_str(),
        )
    }

    pub(crate) fn from_record(record: Record) -> Self {
        Self {
            label: record.label,
            account: record.attributes.account,
            secret: record.secret,
            mfa_arn: record.attributes.comment,
            updated_at: record.attributes.updated_at,
        }
    }
}

impl fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredential")
            .field("label", &self.label)
            .field("account", &self.account)
            .field("secret", &"[REDACTED]")
            .field("mfa_arn", &self.mfa_arn)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl fmt::Display for AccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account {} ({})", self.label, self.account)
    }
}

// ─── Role ────────────────────────────────────────────────────────────────────

/// A named reference to an assumable role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReference {
    pub label: String,
    pub role_arn: String,
}

impl RoleReference {
    pub fn new(label: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            role_arn: role_arn.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_label(&self.label)?;
        validate::validate_role_arn(&self.role_arn)
    }

    pub(crate) fn to_record(&self) -> Record {
        Record::new(
            EntryKind::Role,
            self.label.clone(),
            Attributes {
                account: self.role_arn.clone(),
                ..Attributes::default()
            },
            "",
        )
    }

    pub(crate) fn from_record(record: Record) -> Self {
        Self {
            label: record.label,
            role_arn: record.attributes.account,
        }
    }
}

impl fmt::Display for RoleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role {} ({})", self.label, self.role_arn)
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A temporary key pair plus session token, valid until `expiration`.
#[derive(Clone)]
pub struct SessionPair {
    pub label: String,
    /// The temporary access key id (session prefix).
    pub account: String,
    key_secret: Zeroizing<String>,
    session_token: Zeroizing<String>,
    pub expiration: DateTime<Utc>,
}

impl SessionPair {
    pub fn new(
        label: impl Into<String>,
        account: impl Into<String>,
        key_secret: impl Into<String>,
        session_token: impl Into<String>,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            label: label.into(),
            account: account.into(),
            key_secret: Zeroizing::new(key_secret.into()),
            session_token: Zeroizing::new(session_token.into()),
            expiration,
        }
    }

    pub fn key_secret(&self) -> &str {
        &self.key_secret
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// A pair is stale from the instant its expiration is reached.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_label(&self.label)?;
        validate::validate_session_key(&self.account)?;
        validate::validate_session_token(&self.session_token)
    }

    /// The key record followed by the token record.
    pub(crate) fn to_records(&self) -> [Record; 2] {
        let attributes = Attributes {
            account: self.account.clone(),
            comment: None,
            updated_at: None,
            expires_at: Some(self.expiration),
        };
        [
            Record::new(
                EntryKind::SessionKey,
                self.label.clone(),
                attributes.clone(),
                self.key_secret.as_str(),
            ),
            Record::new(
                EntryKind::SessionToken,
                self.label.clone(),
                attributes,
                self.session_token.as_str(),
            ),
        ]
    }

    /// Rebuild a pair from its two halves. Halves that do not correlate are corrupt.
    pub(crate) fn from_records(key: Record, token: Record) -> Result<Self, StoreError> {
        if key.kind != EntryKind::SessionKey || token.kind != EntryKind::SessionToken {
            return Err(StoreError::Corrupt(format!(
                "session {} built from {} and {} records",
                key.label, key.kind, token.kind
            )));
        }
        if key.label != token.label || key.attributes.account != token.attributes.account {
            return Err(StoreError::Corrupt(format!(
                "session key and token for {} do not belong together",
                key.label
            )));
        }
        let expiration = key.attributes.expires_at.ok_or_else(|| {
            StoreError::Corrupt(format!("session {} has no expiration", key.label))
        })?;

        Ok(Self {
            label: key.label,
            account: key.attributes.account,
            key_secret: key.secret,
            session_token: token.secret,
            expiration,
        })
    }
}

impl fmt::Debug for SessionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPair")
            .field("label", &self.label)
            .field("account", &self.account)
            .field("key_secret", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// Any one of the three stored entity kinds.
#[derive(Debug, Clone)]
pub enum Entity {
    Account(AccountCredential),
    Role(RoleReference),
    Session(SessionPair),
}

impl Entity {
    pub fn kind(&self) -> Kind {
        match self {
            Entity::Account(_) => Kind::Account,
            Entity::Role(_) => Kind::Role,
            Entity::Session(_) => Kind::Session,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Entity::Account(a) => &a.label,
            Entity::Role(r) => &r.label,
            Entity::Session(s) => &s.label,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Entity::Account(a) => a.validate(),
            Entity::Role(r) => r.validate(),
            Entity::Session(s) => s.validate(),
        }
    }

    pub(crate) fn to_records(&self) -> Vec<Record> {
        match self {
            Entity::Account(a) => vec![a.to_record()],
            Entity::Role(r) => vec![r.to_record()],
            Entity::Session(s) => s.to_records().into(),
        }
    }

    pub fn into_account(self) -> Option<AccountCredential> {
        match self {
            Entity::Account(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_role(self) -> Option<RoleReference> {
        match self {
            Entity::Role(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_session(self) -> Option<SessionPair> {
        match self {
            Entity::Session(s) => Some(s),
            _ => None,
        }
    }
}

impl From<AccountCredential> for Entity {
    fn from(a: AccountCredential) -> Self {
        Entity::Account(a)
    }
}

impl From<RoleReference> for Entity {
    fn from(r: RoleReference) -> Self {
        Entity::Role(r)
    }
}

impl From<SessionPair> for Entity {
    fn from(s: SessionPair) -> Self {
        Entity::Session(s)
    }
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// Field changes for a stored account. `None` leaves a field untouched;
/// `mfa_arn: Some(None)` clears the MFA device.
#[derive(Default)]
pub struct AccountUpdate {
    pub account: Option<String>,
    pub secret: Option<Zeroizing<String>>,
    pub mfa_arn: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AccountUpdate {
    /// Swap in a freshly issued key pair.
    pub fn new_key(account: impl Into<String>, secret: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            account: Some(account.into()),
            secret: Some(Zeroizing::new(secret.into())),
            mfa_arn: None,
            updated_at: Some(at),
        }
    }

    pub(crate) fn apply(self, credential: &mut AccountCredential) {
        if let Some(account) = self.account {
            credential.account = account;
        }
        if let Some(secret) = self.secret {
            credential.secret = secret;
        }
        if let Some(mfa_arn) = self.mfa_arn {
            credential.mfa_arn = mfa_arn;
        }
        if let Some(at) = self.updated_at {
            credential.updated_at = Some(at);
        }
    }
}

impl fmt::Debug for AccountUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountUpdate")
            .field("account", &self.account)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("mfa_arn", &self.mfa_arn)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A whole or partial overwrite of one stored entity.
#[derive(Debug)]
pub enum Update {
    Account(AccountUpdate),
    Role { role_arn: String },
    Session(SessionPair),
}

impl Update {
    pub fn kind(&self) -> Kind {
        match self {
            Update::Account(_) => Kind::Account,
            Update::Role { .. } => Kind::Role,
            Update::Session(_) => Kind::Session,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
