//! Observed state of the remote resources
//!
//! Nothing here is persisted. Every value is read back from the provider at
//! the start of a run and only lives for that run.

use crate::error::CloudError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hosted-zone id CloudFront uses for every alias target
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// TTL of the certificate validation CNAME
pub const VALIDATION_RECORD_TTL: i64 = 600;

/// Kinds of resources the convergence run manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    HostedZone,
    Bucket,
    Object,
    Certificate,
    ValidationRecord,
    Distribution,
    AliasRecord,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::HostedZone => write!(f, "hosted-zone"),
            ResourceKind::Bucket => write!(f, "bucket"),
            ResourceKind::Object => write!(f, "object"),
            ResourceKind::Certificate => write!(f, "certificate"),
            ResourceKind::ValidationRecord => write!(f, "validation-record"),
            ResourceKind::Distribution => write!(f, "distribution"),
            ResourceKind::AliasRecord => write!(f, "alias-record"),
        }
    }
}

/// A DNS hosted zone and its delegation set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
    /// Delegated name servers, in the order the provider returned them
    pub name_servers: Vec<String>,
}

/// Canned ACL applied to buckets and objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acl {
    PublicRead,
}

impl Acl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::PublicRead => "public-read",
        }
    }
}

/// Certificate status as reported by the certificate authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    PendingValidation,
    Issued,
    Inactive,
    Expired,
    ValidationTimedOut,
    Revoked,
    Failed,
}

/// What the run does after observing a certificate status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateDisposition {
    /// Certificate is usable, continue to the distribution step
    Proceed,
    /// Certificate authority is still validating, halt until re-run
    AwaitValidation,
    /// Certificate cannot recover without manual remediation
    Fatal,
}

impl CertificateStatus {
    pub const ALL: [CertificateStatus; 7] = [
        CertificateStatus::PendingValidation,
        CertificateStatus::Issued,
        CertificateStatus::Inactive,
        CertificateStatus::Expired,
        CertificateStatus::ValidationTimedOut,
        CertificateStatus::Revoked,
        CertificateStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::PendingValidation => "PENDING_VALIDATION",
            CertificateStatus::Issued => "ISSUED",
            CertificateStatus::Inactive => "INACTIVE",
            CertificateStatus::Expired => "EXPIRED",
            CertificateStatus::ValidationTimedOut => "VALIDATION_TIMED_OUT",
            CertificateStatus::Revoked => "REVOKED",
            CertificateStatus::Failed => "FAILED",
        }
    }

    pub fn disposition(&self) -> CertificateDisposition {
        match self {
            CertificateStatus::Issued => CertificateDisposition::Proceed,
            CertificateStatus::PendingValidation => CertificateDisposition::AwaitValidation,
            CertificateStatus::Inactive
            | CertificateStatus::Expired
            | CertificateStatus::ValidationTimedOut
            | CertificateStatus::Revoked
            | CertificateStatus::Failed => CertificateDisposition::Fatal,
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateStatus {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CertificateStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CloudError::InvalidResponse(format!("unknown certificate status: {s}")))
    }
}

/// One entry of the certificate listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSummary {
    pub arn: String,
    pub domain: String,
}

/// Parameters of a DNS-validated certificate request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub domain: String,
    pub idempotency_token: String,
    /// Certificate transparency logging preference
    pub transparency_logging: bool,
}

/// DNS record the certificate authority polls to prove domain ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub name: String,
    pub record_type: String,
    pub value: String,
}

impl ValidationRecord {
    pub fn to_record_set(&self) -> RecordSet {
        RecordSet {
            name: self.name.clone(),
            record_type: self.record_type.clone(),
            ttl: Some(VALIDATION_RECORD_TTL),
            target: RecordTarget::Values(vec![self.value.clone()]),
        }
    }
}

impl fmt::Display for ValidationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.record_type, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateDetail {
    pub arn: String,
    pub domain: String,
    pub status: CertificateStatus,
    /// Only present once the certificate authority has generated it
    pub validation_record: Option<ValidationRecord>,
}

/// One entry of the distribution listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub id: String,
    pub aliases: Vec<String>,
    pub domain_name: String,
}

impl DistributionSummary {
    pub fn has_alias(&self, domain: &str) -> bool {
        self.aliases.iter().any(|alias| alias == domain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: String,
    /// Edge domain assigned by the CDN (e.g. `d111111abcdef8.cloudfront.net`)
    pub domain_name: String,
    pub status: String,
}

/// Record-set change action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Fails if an identical record already exists
    Create,
    /// Creates or replaces
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTarget {
    pub dns_name: String,
    pub hosted_zone_id: String,
    pub evaluate_target_health: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTarget {
    Values(Vec<String>),
    Alias(AliasTarget),
}

/// A DNS record set inside a hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub name: String,
    pub record_type: String,
    /// Alias records carry no TTL. Neither do records the operator adds by
    /// hand; their TTL is left to the DNS provider.
    pub ttl: Option<i64>,
    pub target: RecordTarget,
}

impl RecordSet {
    /// `CNAME` from `name` to a CloudFront edge domain, for external DNS
    pub fn cname(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: "CNAME".to_string(),
            ttl: None,
            target: RecordTarget::Values(vec![target.into()]),
        }
    }

    /// `A` alias record pointing `name` at a CloudFront edge domain
    pub fn cloudfront_alias(name: impl Into<String>, distribution_domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: "A".to_string(),
            ttl: None,
            target: RecordTarget::Alias(AliasTarget {
                dns_name: distribution_domain.into(),
                hosted_zone_id: CLOUDFRONT_HOSTED_ZONE_ID.to_string(),
                evaluate_target_health: false,
            }),
        }
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            RecordTarget::Values(values) => {
                write!(f, "{} {} {}", self.name, self.record_type, values.join(" "))
            }
            RecordTarget::Alias(target) => {
                write!(f, "{} {} ALIAS {}", self.name, self.record_type, target.dns_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_status_round_trip_through_str() {
        for status in CertificateStatus::ALL {
            assert_eq!(status.as_str().parse::<CertificateStatus>().unwrap(), status);
        }
        assert!("PENDING".parse::<CertificateStatus>().is_err());
    }

    #[test]
    fn test_certificate_disposition_table() {
        use CertificateDisposition::*;
        let expected = [
            (CertificateStatus::PendingValidation, AwaitValidation),
            (CertificateStatus::Issued, Proceed),
            (CertificateStatus::Inactive, Fatal),
            (CertificateStatus::Expired, Fatal),
            (CertificateStatus::ValidationTimedOut, Fatal),
            (CertificateStatus::Revoked, Fatal),
            (CertificateStatus::Failed, Fatal),
        ];
        assert_eq!(expected.len(), CertificateStatus::ALL.len());
        for (status, disposition) in expected {
            assert_eq!(status.disposition(), disposition, "{status}");
        }
    }

    #[test]
    fn test_validation_record_to_record_set() {
        let record = ValidationRecord {
            name: "_abc.example.com.".to_string(),
            record_type: "CNAME".to_string(),
            value: "_xyz.acm-validations.aws.".to_string(),
        };
        let set = record.to_record_set();
        assert_eq!(set.record_type, "CNAME");
        assert_eq!(set.ttl, Some(600));
        assert_eq!(
            set.target,
            RecordTarget::Values(vec!["_xyz.acm-validations.aws.".to_string()])
        );
    }

    #[test]
    fn test_cname_for_external_dns() {
        let set = RecordSet::cname("www.example.com", "d111.cloudfront.net");
        assert_eq!(set.ttl, None);
        assert_eq!(set.to_string(), "www.example.com CNAME d111.cloudfront.net");
    }

    #[test]
    fn test_cloudfront_alias_record() {
        let set = RecordSet::cloudfront_alias("example.com", "d111.cloudfront.net");
        assert_eq!(set.record_type, "A");
        assert_eq!(set.ttl, None);
        match set.target {
            RecordTarget::Alias(target) => {
                assert_eq!(target.dns_name, "d111.cloudfront.net");
                assert_eq!(target.hosted_zone_id, CLOUDFRONT_HOSTED_ZONE_ID);
                assert!(!target.evaluate_target_health);
            }
            other => panic!("expected alias target, got {other:?}"),
        }
    }
}
