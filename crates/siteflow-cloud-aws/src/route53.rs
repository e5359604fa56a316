//! Route 53 hosted zones and record sets

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{
    AliasTarget, Change, ChangeAction as SdkChangeAction, ChangeBatch, DelegationSet,
    HostedZoneConfig, ResourceRecord, ResourceRecordSet, RrType,
};
use siteflow_cloud::{ChangeAction, Dns, HostedZone, RecordSet, RecordTarget};

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

pub struct Route53Dns {
    client: Client,
}

/// `/hostedzone/Z123` → `Z123`
pub fn bare_zone_id(id: &str) -> &str {
    id.trim_start_matches(HOSTED_ZONE_PREFIX)
}

fn hosted_zone(
    operation: &'static str,
    zone: Option<&aws_sdk_route53::types::HostedZone>,
    delegation: Option<&DelegationSet>,
) -> Result<HostedZone> {
    let zone = zone.ok_or_else(|| AwsError::missing(operation, "HostedZone"))?;
    let id: Option<&str> = zone.id().into();
    let name: Option<&str> = zone.name().into();
    let name_servers: Option<&[String]> = delegation.and_then(|d| d.name_servers().into());

    Ok(HostedZone {
        id: bare_zone_id(id.unwrap_or_default()).to_string(),
        name: name.unwrap_or_default().trim_end_matches('.').to_string(),
        name_servers: name_servers.unwrap_or_default().to_vec(),
    })
}

/// Public zone with a comment naming the site
pub fn zone_config(domain: &str) -> HostedZoneConfig {
    HostedZoneConfig::builder()
        .comment(format!("zone for {domain}"))
        .private_zone(false)
        .build()
}

/// Route 53 returns fully qualified, lower-cased names
pub fn same_record(set: &ResourceRecordSet, name: &str, record_type: &str) -> bool {
    let normalize = |n: &str| n.trim_end_matches('.').to_ascii_lowercase();
    normalize(set.name()) == normalize(name) && set.r#type().as_str() == record_type
}

pub fn record_set(record: &RecordSet) -> Result<ResourceRecordSet> {
    let mut builder = ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::from(record.record_type.as_str()));
    if let Some(ttl) = record.ttl {
        builder = builder.ttl(ttl);
    }
    builder = match &record.target {
        RecordTarget::Values(values) => builder.set_resource_records(Some(
            values
                .iter()
                .map(|v| ResourceRecord::builder().value(v).build())
                .collect::<std::result::Result<Vec<_>, _>>()?,
        )),
        RecordTarget::Alias(target) => builder.alias_target(
            AliasTarget::builder()
                .hosted_zone_id(&target.hosted_zone_id)
                .dns_name(&target.dns_name)
                .evaluate_target_health(target.evaluate_target_health)
                .build()?,
        ),
    };
    Ok(builder.build()?)
}

impl Route53Dns {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn create_zone(&self, domain: &str, caller_reference: &str) -> Result<HostedZone> {
        let output = self
            .client
            .create_hosted_zone()
            .name(domain)
            .caller_reference(caller_reference)
            .hosted_zone_config(zone_config(domain))
            .send()
            .await
            .map_err(|e| AwsError::sdk("CreateHostedZone", e))?;

        let zone: Option<&aws_sdk_route53::types::HostedZone> = output.hosted_zone().into();
        let delegation: Option<&DelegationSet> = output.delegation_set().into();
        hosted_zone("CreateHostedZone", zone, delegation)
    }

    async fn get_zone(&self, zone_id: &str) -> Result<HostedZone> {
        let output = self
            .client
            .get_hosted_zone()
            .id(bare_zone_id(zone_id))
            .send()
            .await
            .map_err(|e| AwsError::sdk("GetHostedZone", e))?;

        let zone: Option<&aws_sdk_route53::types::HostedZone> = output.hosted_zone().into();
        let delegation: Option<&DelegationSet> = output.delegation_set().into();
        hosted_zone("GetHostedZone", zone, delegation)
    }

    /// Listing starts at (name, type), so the first entry is the match if any
    async fn find(&self, zone_id: &str, name: &str, record_type: &str) -> Result<bool> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(bare_zone_id(zone_id))
            .start_record_name(name)
            .start_record_type(RrType::from(record_type))
            .max_items(1)
            .send()
            .await
            .map_err(|e| AwsError::sdk("ListResourceRecordSets", e))?;

        Ok(output
            .resource_record_sets()
            .iter()
            .any(|set| same_record(set, name, record_type)))
    }

    async fn change(&self, zone_id: &str, action: ChangeAction, record: &RecordSet) -> Result<()> {
        let batch = ChangeBatch::builder()
            .changes(
                Change::builder()
                    .action(SdkChangeAction::from(action.as_str()))
                    .resource_record_set(record_set(record)?)
                    .build()?,
            )
            .build()?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(bare_zone_id(zone_id))
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| AwsError::sdk("ChangeResourceRecordSets", e))?;
        Ok(())
    }
}

#[async_trait]
impl Dns for Route53Dns {
    async fn create_hosted_zone(
        &self,
        domain: &str,
        caller_reference: &str,
    ) -> siteflow_cloud::Result<HostedZone> {
        tracing::debug!(domain, "CreateHostedZone");
        Ok(self.create_zone(domain, caller_reference).await?)
    }

    async fn get_hosted_zone(&self, zone_id: &str) -> siteflow_cloud::Result<HostedZone> {
        Ok(self.get_zone(zone_id).await?)
    }

    async fn record_exists(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> siteflow_cloud::Result<bool> {
        Ok(self.find(zone_id, name, record_type).await?)
    }

    async fn change_record_set(
        &self,
        zone_id: &str,
        action: ChangeAction,
        record: &RecordSet,
    ) -> siteflow_cloud::Result<()> {
        tracing::debug!(
            zone_id,
            action = action.as_str(),
            name = %record.name,
            record_type = %record.record_type,
            "ChangeResourceRecordSets"
        );
        Ok(self.change(zone_id, action, record).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteflow_cloud::ValidationRecord;

    #[test]
    fn test_bare_zone_id() {
        assert_eq!(bare_zone_id("/hostedzone/Z0001EXAMPLE"), "Z0001EXAMPLE");
        assert_eq!(bare_zone_id("Z0001EXAMPLE"), "Z0001EXAMPLE");
    }

    #[test]
    fn test_zone_config_is_public_with_comment() {
        let config = zone_config("www.example.com");
        assert_eq!(config.comment(), Some("zone for www.example.com"));
        assert!(!config.private_zone());
    }

    #[test]
    fn test_same_record_ignores_trailing_dot_and_case() {
        let set = ResourceRecordSet::builder()
            .name("_abc.www.example.com.")
            .r#type(RrType::Cname)
            .build()
            .unwrap();
        assert!(same_record(&set, "_ABC.www.example.com", "CNAME"));
        assert!(!same_record(&set, "_abc.www.example.com.", "A"));
        assert!(!same_record(&set, "_def.www.example.com.", "CNAME"));
    }

    #[test]
    fn test_validation_record_set() {
        let record = ValidationRecord {
            name: "_abc.www.example.com.".to_string(),
            record_type: "CNAME".to_string(),
            value: "_xyz.acm-validations.aws.".to_string(),
        };
        let set = record_set(&record.to_record_set()).unwrap();
        assert_eq!(set.name(), "_abc.www.example.com.");
        assert_eq!(set.r#type(), &RrType::Cname);
        assert_eq!(set.ttl(), Some(600));
        assert_eq!(set.resource_records()[0].value(), "_xyz.acm-validations.aws.");
        assert!(set.alias_target().is_none());
    }

    #[test]
    fn test_alias_record_set() {
        let set = record_set(&RecordSet::cloudfront_alias(
            "www.example.com",
            "d111.cloudfront.net",
        ))
        .unwrap();
        assert_eq!(set.r#type(), &RrType::A);
        assert_eq!(set.ttl(), None);
        let target = set.alias_target().unwrap();
        assert_eq!(target.hosted_zone_id(), "Z2FDTNDATAQYW2");
        assert_eq!(target.dns_name(), "d111.cloudfront.net");
        assert!(!target.evaluate_target_health());
    }
}
