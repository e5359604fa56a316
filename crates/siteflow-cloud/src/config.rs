//! Per-run configuration passed into the convergence driver

use crate::token::{TokenPurpose, derive_token};
use serde::{Deserialize, Serialize};

/// Where the site's DNS records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsMode {
    /// Hosted zone, validation record and alias record live in the managed DNS
    #[default]
    Managed,
    /// Another provider serves the domain. The operator adds the validation
    /// and CNAME records by hand.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergeConfig {
    /// Site FQDN; also the bucket name and the distribution alias
    pub domain: String,

    /// Existing hosted zone. `None` means the zone must be created.
    pub zone_id: Option<String>,

    /// Skips the certificate lookup when set
    pub certificate_arn: Option<String>,

    /// Skips the distribution lookup when set
    pub distribution_id: Option<String>,

    /// Mixed into every idempotency token
    pub token_salt: String,

    /// Upsert the alias record even when the distribution already existed
    pub repair_alias: bool,

    #[serde(default)]
    pub dns: DnsMode,
}

impl ConvergeConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            zone_id: None,
            certificate_arn: None,
            distribution_id: None,
            token_salt: String::new(),
            repair_alias: false,
            dns: DnsMode::Managed,
        }
    }

    pub fn with_zone_id(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    pub fn with_certificate_arn(mut self, arn: impl Into<String>) -> Self {
        self.certificate_arn = Some(arn.into());
        self
    }

    pub fn with_distribution_id(mut self, id: impl Into<String>) -> Self {
        self.distribution_id = Some(id.into());
        self
    }

    pub fn with_token_salt(mut self, salt: impl Into<String>) -> Self {
        self.token_salt = salt.into();
        self
    }

    pub fn with_repair_alias(mut self, repair: bool) -> Self {
        self.repair_alias = repair;
        self
    }

    pub fn with_dns(mut self, dns: DnsMode) -> Self {
        self.dns = dns;
        self
    }

    /// The bucket shares the site's name
    pub fn bucket(&self) -> &str {
        &self.domain
    }

    pub fn token(&self, purpose: TokenPurpose) -> String {
        derive_token(&self.domain, purpose, &self.token_salt)
    }
}
