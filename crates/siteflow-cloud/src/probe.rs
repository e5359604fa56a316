//! Resource probe
//!
//! Read-only lookups of the current remote state. Any error is a probe
//! failure and ends the run.

use crate::outcome::Failure;
use crate::provider::Backends;
use crate::state::{Distribution, HostedZone, RecordSet, ResourceKind};

pub struct ResourceProbe<'a> {
    backends: &'a Backends,
}

impl<'a> ResourceProbe<'a> {
    pub fn new(backends: &'a Backends) -> Self {
        Self { backends }
    }

    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, Failure> {
        let exists = self
            .backends
            .storage
            .bucket_exists(bucket)
            .await
            .map_err(|e| Failure::probe(ResourceKind::Bucket, e))?;
        tracing::debug!(bucket, exists, "probed bucket");
        Ok(exists)
    }

    pub async fn hosted_zone(&self, zone_id: &str) -> Result<HostedZone, Failure> {
        let zone = self
            .backends
            .dns
            .get_hosted_zone(zone_id)
            .await
            .map_err(|e| Failure::probe(ResourceKind::HostedZone, e))?;
        tracing::debug!(zone_id, name_servers = ?zone.name_servers, "probed hosted zone");
        Ok(zone)
    }

    pub async fn record_exists(
        &self,
        zone_id: &str,
        resource: ResourceKind,
        record: &RecordSet,
    ) -> Result<bool, Failure> {
        let exists = self
            .backends
            .dns
            .record_exists(zone_id, &record.name, &record.record_type)
            .await
            .map_err(|e| Failure::probe(resource, e))?;
        tracing::debug!(zone_id, name = %record.name, exists, "probed record set");
        Ok(exists)
    }

    /// NS records currently visible in public DNS
    pub async fn published_name_servers(&self, domain: &str) -> Result<Vec<String>, Failure> {
        let published = self
            .backends
            .resolver
            .lookup_ns(domain)
            .await
            .map_err(|e| Failure::probe(ResourceKind::HostedZone, e))?;
        tracing::debug!(domain, ?published, "looked up public NS records");
        Ok(published)
    }

    /// ARN of the first certificate whose domain equals `domain` exactly
    pub async fn find_certificate(&self, domain: &str) -> Result<Option<String>, Failure> {
        let certificates = self
            .backends
            .certificates
            .list_certificates()
            .await
            .map_err(|e| Failure::probe(ResourceKind::Certificate, e))?;
        let arn = certificates
            .into_iter()
            .find(|c| c.domain == domain)
            .map(|c| c.arn);
        tracing::debug!(domain, ?arn, "probed certificates");
        Ok(arn)
    }

    /// Id of the first distribution listing `domain` among its aliases
    pub async fn find_distribution(&self, domain: &str) -> Result<Option<String>, Failure> {
        let distributions = self
            .backends
            .cdn
            .list_distributions()
            .await
            .map_err(|e| Failure::probe(ResourceKind::Distribution, e))?;
        let id = distributions
            .into_iter()
            .find(|d| d.has_alias(domain))
            .map(|d| d.id);
        tracing::debug!(domain, ?id, "probed distributions");
        Ok(id)
    }

    pub async fn distribution(&self, id: &str) -> Result<Distribution, Failure> {
        self.backends
            .cdn
            .get_distribution(id)
            .await
            .map_err(|e| Failure::probe(ResourceKind::Distribution, e))
    }
}
