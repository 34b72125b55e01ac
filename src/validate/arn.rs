// Awskeyring — Resource identifier parsing
//
// An ARN is `arn:<partition>:<service>:<region>:<account-id>:<resource>`.
// The resource segment may itself contain colons, so at most six fields are split.

use std::fmt;

use thiserror::Error;

/// The only partition this crate accepts.
pub const PARTITION: &str = "aws";

/// Minimum number of digits in an account id segment.
const MIN_ACCOUNT_ID_LEN: usize = 12;

/// Services whose resources are global and carry an empty region segment.
const GLOBAL_SERVICES: &[&str] = &["iam"];

/// Why a string was rejected as a resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArnError {
    #[error("not a resource identifier")]
    Malformed,

    #[error("partition must be `aws`, found `{0}`")]
    Partition(String),

    #[error("service must be `{expected}`, found `{found}`")]
    Service { expected: String, found: String },

    #[error("service `{service}` is global, found region `{region}`")]
    Region { service: String, region: String },

    #[error("account id must be at least 12 digits")]
    AccountId,

    #[error("resource path is empty")]
    Resource,
}

/// A borrowed, validated view over a resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account_id: &'a str,
    pub resource: &'a str,
}

impl<'a> Arn<'a> {
    /// Split `s` into its segments without judging their contents.
    pub fn parse(s: &'a str) -> Result<Self, ArnError> {
        let mut parts = s.splitn(6, ':');
        let (Some("arn"), Some(partition), Some(service), Some(region), Some(account_id), Some(resource)) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(ArnError::Malformed);
        };

        Ok(Self {
            partition,
            service,
            region,
            account_id,
            resource,
        })
    }

    /// The resource type before the first `/` (e.g. `role`, `mfa`), if any.
    pub fn resource_type(&self) -> Option<&'a str> {
        self.resource
            .split_once('/')
            .map(|(kind, _)| kind)
            .filter(|kind| !kind.is_empty())
    }
}

impl fmt::Display for Arn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

/// Parse `s` and check partition, service, region, account id and resource path.
///
/// Partition and service are checked first: a value failing either is invalid
/// regardless of the remaining segments.
pub fn validate_resource_arn<'a>(s: &'a str, expected_service: &str) -> Result<Arn<'a>, ArnError> {
    let arn = Arn::parse(s)?;

    if arn.partition != PARTITION {
        return Err(ArnError::Partition(arn.partition.to_string()));
    }
    if arn.service != expected_service {
        return Err(ArnError::Service {
            expected: expected_service.to_string(),
            found: arn.service.to_string(),
        });
    }
    if GLOBAL_SERVICES.iter().any(|s| *s == arn.service) && !arn.region.is_empty() {
        return Err(ArnError::Region {
            service: arn.service.to_string(),
            region: arn.region.to_string(),
        });
    }
    if arn.account_id.len() < MIN_ACCOUNT_ID_LEN || !arn.account_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ArnError::AccountId);
    }
    if arn.resource.is_empty() {
        return Err(ArnError::Resource);
    }

    Ok(arn)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_all_segments() {
        let arn = validate_resource_arn("arn:aws:iam::012345678901:role/ops/admin", "iam").unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "iam");
        assert_eq!(arn.region, "");
        assert_eq!(arn.account_id, "012345678901");
        assert_eq!(arn.resource, "role/ops/admin");
        assert_eq!(arn.resource_type(), Some("role"));
        assert_eq!(arn.to_string(), "arn:aws:iam::012345678901:role/ops/admin");
    }

    #[test]
    fn test_resource_may_contain_colons() {
        let arn = Arn::parse("arn:aws:iam::012345678901:role:odd:name").unwrap();
        assert_eq!(arn.resource, "role:odd:name");
        assert_eq!(arn.resource_type(), None);
    }

    #[test]
    fn test_partition_and_service_are_checked_first() {
        assert_eq!(
            validate_resource_arn("arn:azure:iamnot::ABCD45678901:Administrators", "iam"),
            Err(ArnError::Partition("azure".to_string()))
        );
        assert!(matches!(
            validate_resource_arn("arn:aws:iamnot::012345678901:role/x", "iam"),
            Err(ArnError::Service { .. })
        ));
    }

    #[test]
    fn test_global_service_rejects_region() {
        assert_eq!(
            validate_resource_arn("arn:aws:iam:us-east-1:012345678901:role/readonly", "iam"),
            Err(ArnError::Region {
                service: "iam".to_string(),
                region: "us-east-1".to_string()
            })
        );
        assert!(validate_resource_arn("arn:aws:s3:us-east-1:012345678901:bucket/x", "s3").is_ok());
    }

    #[test]
    fn test_account_id_must_be_numeric_and_long_enough() {
        assert_eq!(
            validate_resource_arn("arn:aws:iam::ABCD45678901:role/x", "iam"),
            Err(ArnError::AccountId)
        );
        assert_eq!(
            validate_resource_arn("arn:aws:iam::12345:role/x", "iam"),
            Err(ArnError::AccountId)
        );
        assert_eq!(
            validate_resource_arn("arn:aws:iam:::role/x", "iam"),
            Err(ArnError::AccountId)
        );
    }

    #[test]
    fn test_malformed_and_empty_resource() {
        assert_eq!(validate_resource_arn("", "iam"), Err(ArnError::Malformed));
        assert_eq!(
            validate_resource_arn("arn:aws:iam::012345678901", "iam"),
            Err(ArnError::Malformed)
        );
        assert_eq!(
            validate_resource_arn("urn:aws:iam::012345678901:role/x", "iam"),
            Err(ArnError::Malformed)
        );
        assert_eq!(
            validate_resource_arn("arn:aws:iam::012345678901:", "iam"),
            Err(ArnError::Resource)
        );
    }
}
