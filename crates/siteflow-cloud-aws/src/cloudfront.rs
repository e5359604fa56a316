//! CloudFront distributions
//!
//! Translates a [`DistributionBlueprint`] into the SDK's `DistributionConfig`.
//! The blueprint already carries every value; this module only reshapes it
//! into CloudFront's quantity/items lists.

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_cloudfront::Client;
use aws_sdk_cloudfront::types::{
    Aliases, AllowedMethods, CacheBehavior, CacheBehaviors, CachedMethods, CookiePreference,
    CustomErrorResponse, CustomErrorResponses, CustomOriginConfig, DefaultCacheBehavior,
    DistributionConfig, ForwardedValues, Headers, ItemSelection, Method, MinimumProtocolVersion,
    Origin, OriginProtocolPolicy, OriginSslProtocols, Origins, SslProtocol, SslSupportMethod,
    ViewerCertificate, ViewerProtocolPolicy,
};
use siteflow_cloud::blueprint::{self, DistributionBlueprint};
use siteflow_cloud::{Cdn, Distribution, DistributionSummary};

pub struct CloudFrontCdn {
    client: Client,
}

impl CloudFrontCdn {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list_all(&self) -> Result<Vec<DistributionSummary>> {
        let mut distributions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| AwsError::sdk("ListDistributions", e))?;

            let Some(list) = output.distribution_list() else {
                break;
            };
            let items: Option<&[aws_sdk_cloudfront::types::DistributionSummary]> =
                list.items().into();
            distributions.extend(items.unwrap_or_default().iter().map(summary));

            let truncated: Option<bool> = list.is_truncated().into();
            match list.next_marker() {
                Some(next) if truncated.unwrap_or(false) && !next.is_empty() => {
                    marker = Some(next.to_string())
                }
                _ => break,
            }
        }

        Ok(distributions)
    }

    async fn create(&self, blueprint: &DistributionBlueprint) -> Result<Distribution> {
        let config = distribution_config(blueprint)?;
        let output = self
            .client
            .create_distribution()
            .distribution_config(config)
            .send()
            .await
            .map_err(|e| AwsError::sdk("CreateDistribution", e))?;

        output
            .distribution()
            .map(distribution)
            .ok_or_else(|| AwsError::missing("CreateDistribution", "Distribution"))
    }

    async fn get(&self, id: &str) -> Result<Distribution> {
        let output = self
            .client
            .get_distribution()
            .id(id)
            .send()
            .await
            .map_err(|e| AwsError::sdk("GetDistribution", e))?;

        output
            .distribution()
            .map(distribution)
            .ok_or_else(|| AwsError::missing("GetDistribution", "Distribution"))
    }
}

fn summary(item: &aws_sdk_cloudfront::types::DistributionSummary) -> DistributionSummary {
    let id: Option<&str> = item.id().into();
    let domain_name: Option<&str> = item.domain_name().into();
    let aliases: Option<&Aliases> = item.aliases().into();
    let alias_items: Option<&[String]> = aliases.and_then(|a| a.items().into());

    DistributionSummary {
        id: id.unwrap_or_default().to_string(),
        aliases: alias_items.unwrap_or_default().to_vec(),
        domain_name: domain_name.unwrap_or_default().to_string(),
    }
}

fn distribution(item: &aws_sdk_cloudfront::types::Distribution) -> Distribution {
    let id: Option<&str> = item.id().into();
    let domain_name: Option<&str> = item.domain_name().into();
    let status: Option<&str> = item.status().into();

    Distribution {
        id: id.unwrap_or_default().to_string(),
        domain_name: domain_name.unwrap_or_default().to_string(),
        status: status.unwrap_or_default().to_string(),
    }
}

fn quantity<T>(items: &[T]) -> i32 {
    i32::try_from(items.len()).unwrap_or(i32::MAX)
}

pub fn distribution_config(bp: &DistributionBlueprint) -> Result<DistributionConfig> {
    let cache_behaviors = bp
        .cache_behaviors
        .iter()
        .map(cache_behavior)
        .collect::<Result<Vec<_>>>()?;
    let error_responses = bp
        .custom_error_responses
        .iter()
        .map(|r| {
            CustomErrorResponse::builder()
                .error_code(r.error_code)
                .response_page_path(&r.response_page_path)
                .response_code(&r.response_code)
                .error_caching_min_ttl(r.error_caching_min_ttl)
                .build()
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let config = DistributionConfig::builder()
        .caller_reference(&bp.caller_reference)
        .aliases(
            Aliases::builder()
                .quantity(quantity(&bp.aliases))
                .set_items(Some(bp.aliases.clone()))
                .build()?,
        )
        .default_root_object(&bp.default_root_object)
        .origins(
            Origins::builder()
                .quantity(1)
                .set_items(Some(vec![origin(&bp.origin)?]))
                .build()?,
        )
        .default_cache_behavior(default_cache_behavior(&bp.default_behavior)?)
        .cache_behaviors(
            CacheBehaviors::builder()
                .quantity(quantity(&cache_behaviors))
                .set_items(Some(cache_behaviors))
                .build()?,
        )
        .custom_error_responses(
            CustomErrorResponses::builder()
                .quantity(quantity(&error_responses))
                .set_items(Some(error_responses))
                .build()?,
        )
        .comment(&bp.comment)
        .enabled(bp.enabled)
        .viewer_certificate(
            ViewerCertificate::builder()
                .acm_certificate_arn(&bp.viewer_certificate.acm_certificate_arn)
                .ssl_support_method(SslSupportMethod::from(
                    bp.viewer_certificate.ssl_support_method.as_str(),
                ))
                .minimum_protocol_version(MinimumProtocolVersion::from(
                    bp.viewer_certificate.minimum_protocol_version.as_str(),
                ))
                .build(),
        )
        .is_ipv6_enabled(bp.ipv6_enabled)
        .build()?;
    Ok(config)
}

fn origin(origin: &blueprint::Origin) -> Result<Origin> {
    let protocols: Vec<SslProtocol> = origin
        .ssl_protocols
        .iter()
        .map(|p| SslProtocol::from(p.as_str()))
        .collect();

    let custom = CustomOriginConfig::builder()
        .http_port(origin.http_port)
        .https_port(origin.https_port)
        .origin_protocol_policy(OriginProtocolPolicy::from(origin.protocol_policy.as_str()))
        .origin_ssl_protocols(
            OriginSslProtocols::builder()
                .quantity(quantity(&protocols))
                .set_items(Some(protocols))
                .build()?,
        )
        .origin_read_timeout(origin.read_timeout)
        .origin_keepalive_timeout(origin.keepalive_timeout)
        .build()?;

    Ok(Origin::builder()
        .id(&origin.id)
        .domain_name(&origin.domain_name)
        .origin_path(&origin.origin_path)
        .custom_origin_config(custom)
        .build()?)
}

fn allowed_methods(behavior: &blueprint::CacheBehavior) -> Result<AllowedMethods> {
    let methods = |names: &[String]| -> Vec<Method> {
        names.iter().map(|m| Method::from(m.as_str())).collect()
    };
    let cached = methods(&behavior.cached_methods);
    let allowed = methods(&behavior.allowed_methods);

    Ok(AllowedMethods::builder()
        .quantity(quantity(&allowed))
        .set_items(Some(allowed))
        .cached_methods(
            CachedMethods::builder()
                .quantity(quantity(&cached))
                .set_items(Some(cached))
                .build()?,
        )
        .build()?)
}

fn forwarded_values(behavior: &blueprint::CacheBehavior) -> Result<ForwardedValues> {
    Ok(ForwardedValues::builder()
        .query_string(behavior.forward_query_string)
        .cookies(
            CookiePreference::builder()
                .forward(ItemSelection::from(behavior.forward_cookies.as_str()))
                .build()?,
        )
        .headers(
            Headers::builder()
                .quantity(quantity(&behavior.forwarded_headers))
                .set_items(Some(behavior.forwarded_headers.clone()))
                .build()?,
        )
        .build()?)
}

fn default_cache_behavior(behavior: &blueprint::CacheBehavior) -> Result<DefaultCacheBehavior> {
    Ok(DefaultCacheBehavior::builder()
        .target_origin_id(&behavior.target_origin_id)
        .viewer_protocol_policy(ViewerProtocolPolicy::from(
            behavior.viewer_protocol_policy.as_str(),
        ))
        .allowed_methods(allowed_methods(behavior)?)
        .forwarded_values(forwarded_values(behavior)?)
        .min_ttl(behavior.min_ttl)
        .default_ttl(behavior.default_ttl)
        .max_ttl(behavior.max_ttl)
        .compress(behavior.compress)
        .build()?)
}

fn cache_behavior(behavior: &blueprint::CacheBehavior) -> Result<CacheBehavior> {
    let pattern = behavior
        .path_pattern
        .as_deref()
        .ok_or_else(|| AwsError::missing("CreateDistribution", "PathPattern"))?;

    Ok(CacheBehavior::builder()
        .path_pattern(pattern)
        .target_origin_id(&behavior.target_origin_id)
        .viewer_protocol_policy(ViewerProtocolPolicy::from(
            behavior.viewer_protocol_policy.as_str(),
        ))
        .allowed_methods(allowed_methods(behavior)?)
        .forwarded_values(forwarded_values(behavior)?)
        .min_ttl(behavior.min_ttl)
        .default_ttl(behavior.default_ttl)
        .max_ttl(behavior.max_ttl)
        .compress(behavior.compress)
        .build()?)
}

#[async_trait]
impl Cdn for CloudFrontCdn {
    async fn list_distributions(&self) -> siteflow_cloud::Result<Vec<DistributionSummary>> {
        Ok(self.list_all().await?)
    }

    async fn create_distribution(
        &self,
        blueprint: &DistributionBlueprint,
    ) -> siteflow_cloud::Result<Distribution> {
        tracing::debug!(caller_reference = %blueprint.caller_reference, "CreateDistribution");
        Ok(self.create(blueprint).await?)
    }

    async fn get_distribution(&self, id: &str) -> siteflow_cloud::Result<Distribution> {
        Ok(self.get(id).await?)
    }
}
