use async_trait::async_trait;
use siteflow_cloud::blueprint::DistributionBlueprint;
use siteflow_cloud::{
    Acl, AssetSource, Backends, Cdn, CertificateAuthority, CertificateDetail, CertificateRequest,
    CertificateStatus, CertificateSummary, ChangeAction, CloudError, ConvergeConfig, Distribution,
    DistributionSummary, Dns, HostedZone, NameServerLookup, ObjectStorage, RecordSet, Result,
    ValidationRecord,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "www.example.com";

/// Calls that change remote state
pub const MUTATING_CALLS: [&str; 6] = [
    "create_hosted_zone",
    "create_bucket",
    "put_object",
    "request_certificate",
    "create_distribution",
    "change_record_set",
];

#[derive(Debug, Clone)]
pub struct FakeCertificate {
    pub arn: String,
    pub domain: String,
    pub token: String,
    pub status: CertificateStatus,
    pub validation_record: Option<ValidationRecord>,
}

#[derive(Debug, Clone)]
pub struct FakeDistribution {
    pub summary: DistributionSummary,
    pub blueprint: Option<DistributionBlueprint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub acl: Acl,
}

#[derive(Default)]
pub struct CloudState {
    pub zones: BTreeMap<String, HostedZone>,
    pub zone_references: HashMap<String, String>,
    /// NS records visible in public DNS, by domain
    pub published: HashMap<String, Vec<String>>,
    pub buckets: HashMap<String, Acl>,
    pub objects: BTreeMap<(String, String), StoredObject>,
    pub certificates: Vec<FakeCertificate>,
    /// New certificates come without a validation record when set
    pub delay_validation_record: bool,
    pub distributions: Vec<FakeDistribution>,
    pub records: BTreeMap<(String, String, String), RecordSet>,
    pub assets: HashMap<String, Vec<u8>>,
    pub failures: HashMap<String, String>,
    pub calls: Vec<String>,
}

/// In-memory stand-in for every collaborator of a run
#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<CloudState>,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Arc<Self> {
        let cloud = Self::default();
        {
            let mut state = cloud.state.lock().unwrap();
            state
                .assets
                .insert("index.html".to_string(), b"<h1>hello</h1>".to_vec());
            state
                .assets
                .insert("404.html".to_string(), b"<h1>not found</h1>".to_vec());
        }
        Arc::new(cloud)
    }

    pub fn backends(self: &Arc<Self>) -> Backends {
        Backends {
            storage: self.clone(),
            certificates: self.clone(),
            cdn: self.clone(),
            dns: self.clone(),
            resolver: self.clone(),
            assets: self.clone(),
        }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, CloudState> {
        self.state.lock().unwrap()
    }

    /// Zone for `domain` with delegation already published; returns its id
    pub fn delegated_zone(&self, domain: &str) -> String {
        let id = self.add_zone(domain);
        self.publish_delegation(&id);
        id
    }

    pub fn add_zone(&self, domain: &str) -> String {
        let mut state = self.state();
        let n = state.zones.len() + 1;
        let zone = zone_for(domain, n);
        let id = zone.id.clone();
        state.zones.insert(id.clone(), zone);
        id
    }

    /// Publish the zone's NS set in public DNS, shuffled and fully qualified
    pub fn publish_delegation(&self, zone_id: &str) {
        let mut state = self.state();
        let zone = state.zones[zone_id].clone();
        let mut published: Vec<String> = zone
            .name_servers
            .iter()
            .map(|ns| format!("{}.", ns.to_uppercase()))
            .collect();
        published.reverse();
        state.published.insert(zone.name, published);
    }

    pub fn publish_name_servers(&self, domain: &str, name_servers: &[&str]) {
        self.state().published.insert(
            domain.to_string(),
            name_servers.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn add_bucket(&self, bucket: &str) {
        self.state()
            .buckets
            .insert(bucket.to_string(), Acl::PublicRead);
    }

    /// Certificate in `status` with a validation record; returns its ARN
    pub fn add_certificate(&self, domain: &str, status: CertificateStatus) -> String {
        let mut state = self.state();
        let n = state.certificates.len() + 1;
        let certificate = certificate_for(domain, n, "preexisting", status, true);
        let arn = certificate.arn.clone();
        state.certificates.push(certificate);
        arn
    }

    pub fn set_certificate_status(&self, arn: &str, status: CertificateStatus) {
        let mut state = self.state();
        if let Some(certificate) = state.certificates.iter_mut().find(|c| c.arn == arn) {
            certificate.status = status;
        }
    }

    pub fn issue_all_certificates(&self) {
        for certificate in self.state().certificates.iter_mut() {
            certificate.status = CertificateStatus::Issued;
        }
    }

    /// Pre-existing distribution aliased to `domain`; returns its id
    pub fn add_distribution(&self, domain: &str) -> String {
        let mut state = self.state();
        let n = state.distributions.len() + 1;
        let summary = DistributionSummary {
            id: format!("EPRE{n}"),
            aliases: vec![domain.to_string()],
            domain_name: format!("dpre{n}.cloudfront.net"),
        };
        let id = summary.id.clone();
        state.distributions.push(FakeDistribution {
            summary,
            blueprint: None,
        });
        id
    }

    /// Make every later call to `operation` fail with `message`
    pub fn fail_on(&self, operation: &str, message: &str) {
        self.state()
            .failures
            .insert(operation.to_string(), message.to_string());
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn count(&self, operation: &str) -> usize {
        self.state().calls.iter().filter(|c| *c == operation).count()
    }

    pub fn mutating_calls(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|c| MUTATING_CALLS.contains(&c.as_str()))
            .cloned()
            .collect()
    }

    /// Index of the first call to `operation`
    pub fn position(&self, operation: &str) -> Option<usize> {
        self.state().calls.iter().position(|c| c == operation)
    }

    fn enter(&self, operation: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(operation.to_string());
        match state.failures.get(operation) {
            Some(message) => Err(CloudError::ApiError(message.clone())),
            None => Ok(()),
        }
    }
}

/// Config for a domain whose zone is known
#[allow(dead_code)]
pub fn config_with_zone(zone_id: &str) -> ConvergeConfig {
    ConvergeConfig::new(DOMAIN).with_zone_id(zone_id)
}

/// Cloud with a delegated zone, bucket, issued certificate and distribution
#[allow(dead_code)]
pub fn provisioned_cloud() -> (Arc<FakeCloud>, ConvergeConfig) {
    let cloud = FakeCloud::new();
    let zone_id = cloud.delegated_zone(DOMAIN);
    cloud.add_bucket(DOMAIN);
    cloud.add_certificate(DOMAIN, CertificateStatus::Issued);
    cloud.add_distribution(DOMAIN);
    (cloud, config_with_zone(&zone_id))
}

fn zone_for(domain: &str, n: usize) -> HostedZone {
    HostedZone {
        id: format!("Z{n:04}EXAMPLE"),
        name: domain.to_string(),
        name_servers: vec![
            format!("ns-{n}1.awsdns-01.com"),
            format!("ns-{n}2.awsdns-02.net"),
            format!("ns-{n}3.awsdns-03.org"),
            format!("ns-{n}4.awsdns-04.co.uk"),
        ],
    }
}

fn certificate_for(
    domain: &str,
    n: usize,
    token: &str,
    status: CertificateStatus,
    with_record: bool,
) -> FakeCertificate {
    FakeCertificate {
        arn: format!("arn:aws:acm:us-east-1:123456789012:certificate/cert-{n}"),
        domain: domain.to_string(),
        token: token.to_string(),
        status,
        validation_record: with_record.then(|| ValidationRecord {
            name: format!("_v{n}.{domain}."),
            record_type: "CNAME".to_string(),
            value: format!("_t{n}.acm-validations.aws."),
        }),
    }
}

#[async_trait]
impl ObjectStorage for FakeCloud {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.enter("bucket_exists")?;
        Ok(self.state().buckets.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str, acl: Acl) -> Result<()> {
        self.enter("create_bucket")?;
        let mut state = self.state();
        if state.buckets.contains_key(bucket) {
            return Err(CloudError::ResourceAlreadyExists(bucket.to_string()));
        }
        state.buckets.insert(bucket.to_string(), acl);
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        acl: Acl,
    ) -> Result<()> {
        self.enter("put_object")?;
        let mut state = self.state();
        if !state.buckets.contains_key(bucket) {
            return Err(CloudError::ResourceNotFound(bucket.to_string()));
        }
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                acl,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl CertificateAuthority for FakeCloud {
    async fn list_certificates(&self) -> Result<Vec<CertificateSummary>> {
        self.enter("list_certificates")?;
        Ok(self
            .state()
            .certificates
            .iter()
            .map(|c| CertificateSummary {
                arn: c.arn.clone(),
                domain: c.domain.clone(),
            })
            .collect())
    }

    async fn request_certificate(&self, request: &CertificateRequest) -> Result<String> {
        self.enter("request_certificate")?;
        let mut state = self.state();
        // Same token for the same domain returns the earlier request
        if let Some(existing) = state
            .certificates
            .iter()
            .find(|c| c.domain == request.domain && c.token == request.idempotency_token)
        {
            return Ok(existing.arn.clone());
        }
        let n = state.certificates.len() + 1;
        let with_record = !state.delay_validation_record;
        let certificate = certificate_for(
            &request.domain,
            n,
            &request.idempotency_token,
            CertificateStatus::PendingValidation,
            with_record,
        );
        let arn = certificate.arn.clone();
        state.certificates.push(certificate);
        Ok(arn)
    }

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetail> {
        self.enter("describe_certificate")?;
        self.state()
            .certificates
            .iter()
            .find(|c| c.arn == arn)
            .map(|c| CertificateDetail {
                arn: c.arn.clone(),
                domain: c.domain.clone(),
                status: c.status,
                validation_record: c.validation_record.clone(),
            })
            .ok_or_else(|| CloudError::ResourceNotFound(arn.to_string()))
    }
}

#[async_trait]
impl Cdn for FakeCloud {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>> {
        self.enter("list_distributions")?;
        Ok(self
            .state()
            .distributions
            .iter()
            .map(|d| d.summary.clone())
            .collect())
    }

    async fn create_distribution(&self, blueprint: &DistributionBlueprint) -> Result<Distribution> {
        self.enter("create_distribution")?;
        let mut state = self.state();
        let duplicate = state.distributions.iter().any(|d| {
            d.blueprint
                .as_ref()
                .is_some_and(|b| b.caller_reference == blueprint.caller_reference)
        });
        if duplicate {
            return Err(CloudError::ResourceAlreadyExists(
                blueprint.caller_reference.clone(),
            ));
        }
        let n = state.distributions.len() + 1;
        let summary = DistributionSummary {
            id: format!("ENEW{n}"),
            aliases: blueprint.aliases.clone(),
            domain_name: format!("dnew{n}.cloudfront.net"),
        };
        let distribution = Distribution {
            id: summary.id.clone(),
            domain_name: summary.domain_name.clone(),
            status: "InProgress".to_string(),
        };
        state.distributions.push(FakeDistribution {
            summary,
            blueprint: Some(blueprint.clone()),
        });
        Ok(distribution)
    }

    async fn get_distribution(&self, id: &str) -> Result<Distribution> {
        self.enter("get_distribution")?;
        self.state()
            .distributions
            .iter()
            .find(|d| d.summary.id == id)
            .map(|d| Distribution {
                id: d.summary.id.clone(),
                domain_name: d.summary.domain_name.clone(),
                status: "Deployed".to_string(),
            })
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))
    }
}

#[async_trait]
impl Dns for FakeCloud {
    async fn create_hosted_zone(&self, domain: &str, caller_reference: &str) -> Result<HostedZone> {
        self.enter("create_hosted_zone")?;
        let mut state = self.state();
        if state.zone_references.contains_key(caller_reference) {
            return Err(CloudError::ResourceAlreadyExists(
                caller_reference.to_string(),
            ));
        }
        let n = state.zones.len() + 1;
        let zone = zone_for(domain, n);
        state
            .zone_references
            .insert(caller_reference.to_string(), zone.id.clone());
        state.zones.insert(zone.id.clone(), zone.clone());
        Ok(zone)
    }

    async fn get_hosted_zone(&self, zone_id: &str) -> Result<HostedZone> {
        self.enter("get_hosted_zone")?;
        self.state()
            .zones
            .get(zone_id)
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(zone_id.to_string()))
    }

    async fn change_record_set(
        &self,
        zone_id: &str,
        action: ChangeAction,
        record: &RecordSet,
    ) -> Result<()> {
        self.enter("change_record_set")?;
        let mut state = self.state();
        if !state.zones.contains_key(zone_id) {
            return Err(CloudError::ResourceNotFound(zone_id.to_string()));
        }
        let key = (
            zone_id.to_string(),
            record.name.clone(),
            record.record_type.clone(),
        );
        if action == ChangeAction::Create && state.records.contains_key(&key) {
            return Err(CloudError::ResourceAlreadyExists(format!(
                "{} {}",
                record.name, record.record_type
            )));
        }
        state.records.insert(key, record.clone());
        Ok(())
    }

    async fn record_exists(&self, zone_id: &str, name: &str, record_type: &str) -> Result<bool> {
        self.enter("record_exists")?;
        let key = (zone_id.to_string(), name.to_string(), record_type.to_string());
        Ok(self.state().records.contains_key(&key))
    }
}

#[async_trait]
impl NameServerLookup for FakeCloud {
    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>> {
        self.enter("lookup_ns")?;
        Ok(self
            .state()
            .published
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AssetSource for FakeCloud {
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.enter("load")?;
        self.state().assets.get(key).cloned().ok_or_else(|| {
            CloudError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{key} not found"),
            ))
        })
    }
}

/// Records of one type in a zone
#[allow(dead_code)]
pub fn records_of_type(cloud: &FakeCloud, record_type: &str) -> Vec<RecordSet> {
    cloud
        .state()
        .records
        .values()
        .filter(|r| r.record_type == record_type)
        .cloned()
        .collect()
}

