//! Public NS lookup through the host's DNS configuration

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use siteflow_cloud::{CloudError, NameServerLookup};
use std::net::IpAddr;

pub struct PublicDnsResolver {
    resolver: TokioResolver,
}

impl PublicDnsResolver {
    /// Uses the system resolver configuration, falling back to hickory's
    /// default upstreams when it cannot be read
    pub fn from_system() -> Self {
        let resolver = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(e) => {
                tracing::warn!("failed to load system DNS configuration, using defaults: {e}");
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .with_options(ResolverOpts::default())
                .build()
            }
        };
        Self { resolver }
    }

    /// Queries only the given name servers
    pub fn with_name_servers(ips: &[IpAddr], port: u16, options: ResolverOpts) -> Self {
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(ips, port, true),
        );
        let resolver = TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(options)
            .build();
        Self { resolver }
    }
}

#[async_trait]
impl NameServerLookup for PublicDnsResolver {
    /// NXDOMAIN and an empty NS answer read as "nothing published". Any other
    /// resolver error (timeout, SERVFAIL, refused) is an error.
    async fn lookup_ns(&self, domain: &str) -> siteflow_cloud::Result<Vec<String>> {
        match self.resolver.ns_lookup(domain).await {
            Ok(response) => Ok(response
                .iter()
                .map(|ns| ns.to_string().trim_end_matches('.').to_string())
                .collect()),
            Err(e) if e.is_no_records_found() || e.is_nx_domain() => {
                tracing::debug!(domain, "no NS records: {e}");
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::warn!(domain, "NS lookup failed: {e}");
                Err(CloudError::ApiError(format!("NS lookup for {domain} failed: {e}")))
            }
        }
    }
}
