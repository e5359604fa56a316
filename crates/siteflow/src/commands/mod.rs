pub mod plan;
pub mod up;

use crate::assets::DirAssets;
use siteflow_cloud::{ConvergeConfig, Converger, DnsMode};
use siteflow_cloud_aws::AwsCloud;
use siteflow_config::SiteConfig;
use std::sync::Arc;

pub fn converge_config(config: &SiteConfig) -> ConvergeConfig {
    let mut converge = ConvergeConfig::new(&config.domain)
        .with_token_salt(&config.token_salt)
        .with_repair_alias(config.repair_alias)
        .with_dns(match config.dns {
            siteflow_config::DnsMode::Route53 => DnsMode::Managed,
            siteflow_config::DnsMode::External => DnsMode::External,
        });
    if let Some(zone_id) = &config.zone_id {
        converge = converge.with_zone_id(zone_id);
    }
    if let Some(arn) = &config.certificate_arn {
        converge = converge.with_certificate_arn(arn);
    }
    if let Some(id) = &config.distribution_id {
        converge = converge.with_distribution_id(id);
    }
    converge
}

/// AWS backends with the local assets directory as the seed source
pub async fn converger(config: &SiteConfig) -> Converger {
    let cloud = AwsCloud::load(&config.region).await;
    tracing::debug!(region = cloud.region(), "loaded AWS configuration");
    let assets = Arc::new(DirAssets::new(&config.assets_dir));
    Converger::new(converge_config(config), cloud.backends(assets))
}
