// Awskeyring — Input Validation
//
// Pure format checks that gate what may enter the secret store. Every check
// returns `Ok(())` or a `ValidationError` whose Display text is the reason
// surfaced to the user verbatim. No state, no I/O.

mod arn;

use thiserror::Error;

pub use arn::{validate_resource_arn, Arn, ArnError};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Prefix of a long-lived access key id.
pub const LONG_LIVED_KEY_PREFIX: &str = "AKIA";

/// Prefix of a temporary (session) access key id.
pub const SESSION_KEY_PREFIX: &str = "ASIA";

/// Total length of an access key id, prefix included.
pub const ACCESS_KEY_LEN: usize = 20;

/// Length of a secret access key.
pub const SECRET_KEY_LEN: usize = 40;

/// Service segment of identity resources (roles and MFA devices).
pub const IAM_SERVICE: &str = "iam";

/// Bounds on the lifetime of a federated session, in seconds.
pub const MIN_SESSION_SECS: i64 = 900;
pub const MAX_SESSION_SECS: i64 = 129_600;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A named validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid Access Key")]
    AccessKey,

    #[error("Secret Access Key is not 40 chars")]
    SecretLength,

    #[error("Invalid MFA ARN")]
    MfaArn,

    #[error("Invalid Role ARN")]
    RoleArn,

    #[error("Invalid Session Key")]
    SessionKey,

    #[error("Session Token is empty")]
    SessionToken,

    #[error("Invalid Label")]
    Label,

    #[error("Invalid Duration")]
    Duration,
}

// ─── Checks ──────────────────────────────────────────────────────────────────

/// Valid iff `s` is `AKIA` or `ASIA` followed by 16 uppercase letters or digits.
pub fn validate_access_key(s: &str) -> Result<(), ValidationError> {
    let prefixed = s.starts_with(LONG_LIVED_KEY_PREFIX) || s.starts_with(SESSION_KEY_PREFIX);
    let charset_ok = s
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

    if s.len() == ACCESS_KEY_LEN && prefixed && charset_ok {
        Ok(())
    } else {
        Err(ValidationError::AccessKey)
    }
}

/// Valid iff `s` is exactly 40 characters long.
pub fn validate_secret(s: &str) -> Result<(), ValidationError> {
    if s.chars().count() == SECRET_KEY_LEN {
        Ok(())
    } else {
        Err(ValidationError::SecretLength)
    }
}

/// Valid iff `s` names an MFA device: `arn:aws:iam::<account>:mfa/<name>`.
pub fn validate_mfa_arn(s: &str) -> Result<(), ValidationError> {
    match validate_resource_arn(s, IAM_SERVICE) {
        Ok(arn) if arn.resource_type() == Some("mfa") => Ok(()),
        _ => Err(ValidationError::MfaArn),
    }
}

/// Valid iff `s` names a role: `arn:aws:iam::<account>:role/<path>`.
pub fn validate_role_arn(s: &str) -> Result<(), ValidationError> {
    match validate_resource_arn(s, IAM_SERVICE) {
        Ok(arn) if arn.resource_type() == Some("role") => Ok(()),
        _ => Err(ValidationError::RoleArn),
    }
}

/// Valid iff `s` is a well-formed access key id carrying the session prefix.
pub fn validate_session_key(s: &str) -> Result<(), ValidationError> {
    if s.starts_with(SESSION_KEY_PREFIX) && validate_access_key(s).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::SessionKey)
    }
}

/// Session tokens are opaque; only emptiness is rejected.
pub fn validate_session_token(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        Err(ValidationError::SessionToken)
    } else {
        Ok(())
    }
}

/// Labels are non-empty and contain no whitespace or control characters.
pub fn validate_label(s: &str) -> Result<(), ValidationError> {
    if !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Ok(())
    } else {
        Err(ValidationError::Label)
    }
}

/// Federated session lifetimes must fall within the service's accepted range.
pub fn validate_session_duration(secs: i64) -> Result<(), ValidationError> {
    if (MIN_SESSION_SECS..=MAX_SESSION_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ValidationError::Duration)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
