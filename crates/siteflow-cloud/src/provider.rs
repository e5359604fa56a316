//! Capability traits for the external systems a run talks to
//!
//! Each trait covers exactly the calls the convergence run needs from one
//! provider. Implementations are expected to map any non-success response
//! to an `Err`; the run decides whether that is fatal.

use crate::blueprint::DistributionBlueprint;
use crate::error::Result;
use crate::state::{
    Acl, CertificateDetail, CertificateRequest, CertificateSummary, ChangeAction, Distribution,
    DistributionSummary, HostedZone, RecordSet,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Object storage (S3 and compatible)
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    async fn create_bucket(&self, bucket: &str, acl: Acl) -> Result<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        acl: Acl,
    ) -> Result<()>;
}

/// Certificate authority (ACM)
#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    /// Every certificate in the account/region
    async fn list_certificates(&self) -> Result<Vec<CertificateSummary>>;

    /// Request a DNS-validated certificate, returning its ARN
    async fn request_certificate(&self, request: &CertificateRequest) -> Result<String>;

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetail>;
}

/// Content delivery network (CloudFront)
#[async_trait]
pub trait Cdn: Send + Sync {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>>;

    async fn create_distribution(&self, blueprint: &DistributionBlueprint) -> Result<Distribution>;

    async fn get_distribution(&self, id: &str) -> Result<Distribution>;
}

/// Authoritative DNS (Route 53)
#[async_trait]
pub trait Dns: Send + Sync {
    async fn create_hosted_zone(&self, domain: &str, caller_reference: &str) -> Result<HostedZone>;

    async fn get_hosted_zone(&self, zone_id: &str) -> Result<HostedZone>;

    /// Whether a record set with this name and type exists in the zone
    async fn record_exists(&self, zone_id: &str, name: &str, record_type: &str) -> Result<bool>;

    /// Apply a single change. A `Create` of an existing record yields
    /// `CloudError::ResourceAlreadyExists`.
    async fn change_record_set(
        &self,
        zone_id: &str,
        action: ChangeAction,
        record: &RecordSet,
    ) -> Result<()>;
}

/// Public DNS lookup of the NS records currently delegated for a domain
#[async_trait]
pub trait NameServerLookup: Send + Sync {
    /// Empty when nothing is published
    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>>;
}

/// Local site content seeded into the bucket on creation
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

/// Every collaborator a run needs
#[derive(Clone)]
pub struct Backends {
    pub storage: Arc<dyn ObjectStorage>,
    pub certificates: Arc<dyn CertificateAuthority>,
    pub cdn: Arc<dyn Cdn>,
    pub dns: Arc<dyn Dns>,
    pub resolver: Arc<dyn NameServerLookup>,
    pub assets: Arc<dyn AssetSource>,
}
