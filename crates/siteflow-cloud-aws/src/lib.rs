//! AWS collaborators for SiteFlow
//!
//! Implements the `siteflow-cloud` capability traits on top of the AWS SDK
//! for Rust:
//!
//! | trait | service |
//! |---|---|
//! | `ObjectStorage` | S3 |
//! | `CertificateAuthority` | ACM (always `us-east-1`) |
//! | `Cdn` | CloudFront |
//! | `Dns` | Route 53 |
//! | `NameServerLookup` | public DNS via hickory |
//!
//! Credentials come from the SDK's default provider chain
//! (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`, profiles, IMDS).
//!
//! # Example
//!
//! ```ignore
//! use siteflow_cloud_aws::AwsCloud;
//!
//! let cloud = AwsCloud::load("ap-northeast-1").await;
//! let backends = cloud.backends(assets);
//! ```

pub mod acm;
pub mod cloudfront;
pub mod error;
pub mod resolver;
pub mod route53;
pub mod s3;

pub use acm::AcmCertificates;
pub use cloudfront::CloudFrontCdn;
pub use error::{AwsError, Result};
pub use resolver::PublicDnsResolver;
pub use route53::Route53Dns;
pub use s3::S3Storage;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use siteflow_cloud::{AssetSource, Backends};
use std::sync::Arc;

/// Shared SDK configuration for every AWS client of a run
pub struct AwsCloud {
    shared: SdkConfig,
    region: String,
}

impl AwsCloud {
    pub async fn load(region: &str) -> Self {
        tracing::debug!(region, "loading AWS configuration");
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            shared,
            region: region.to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn backends(&self, assets: Arc<dyn AssetSource>) -> Backends {
        let acm_config = aws_sdk_acm::config::Builder::from(&self.shared)
            .region(Region::new(acm::CERTIFICATE_REGION))
            .build();

        Backends {
            storage: Arc::new(S3Storage::new(
                aws_sdk_s3::Client::new(&self.shared),
                &self.region,
            )),
            certificates: Arc::new(AcmCertificates::new(aws_sdk_acm::Client::from_conf(
                acm_config,
            ))),
            cdn: Arc::new(CloudFrontCdn::new(aws_sdk_cloudfront::Client::new(
                &self.shared,
            ))),
            dns: Arc::new(Route53Dns::new(aws_sdk_route53::Client::new(&self.shared))),
            resolver: Arc::new(PublicDnsResolver::from_system()),
            assets,
        }
    }
}
