//! Distribution blueprint
//!
//! The CDN configuration is a fixed template parameterised only by the
//! domain, the certificate ARN and the caller reference. Static-asset cache
//! behaviors are generated from [`STATIC_ASSET_RULES`].

use serde::{Deserialize, Serialize};

pub const DEFAULT_ROOT_OBJECT: &str = "index.html";
pub const NOT_FOUND_PAGE_PATH: &str = "/404.html";

const ALL_METHODS: [&str; 7] = ["HEAD", "DELETE", "POST", "GET", "OPTIONS", "PUT", "PATCH"];
const READ_METHODS: [&str; 2] = ["GET", "HEAD"];
const CACHED_METHODS: [&str; 2] = ["HEAD", "GET"];

const FORWARDED_HEADERS: [&str; 8] = [
    "Accept",
    "Accept-Language",
    "Authorization",
    "CloudFront-Forwarded-Proto",
    "Host",
    "Origin",
    "Referer",
    "User-agent",
];

const ONE_DAY: i64 = 86_400;
const ONE_YEAR: i64 = 31_536_000;

/// Cache rule for one static-asset path pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRule {
    pub pattern: &'static str,
    pub min_ttl: i64,
    pub default_ttl: i64,
    pub max_ttl: i64,
}

impl AssetRule {
    const fn long_lived(pattern: &'static str) -> Self {
        Self {
            pattern,
            min_ttl: 0,
            default_ttl: ONE_DAY,
            max_ttl: ONE_YEAR,
        }
    }
}

pub const STATIC_ASSET_RULES: [AssetRule; 5] = [
    AssetRule::long_lived("*.png"),
    AssetRule::long_lived("*.jpg"),
    AssetRule::long_lived("*.gif"),
    AssetRule::long_lived("*.css"),
    AssetRule::long_lived("*.js"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookieForwarding {
    All,
    Omit,
}

impl CookieForwarding {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookieForwarding::All => "all",
            CookieForwarding::Omit => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub id: String,
    pub domain_name: String,
    pub origin_path: String,
    pub http_port: i32,
    pub https_port: i32,
    pub protocol_policy: String,
    pub ssl_protocols: Vec<String>,
    pub keepalive_timeout: i32,
    pub read_timeout: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerCertificate {
    pub acm_certificate_arn: String,
    pub minimum_protocol_version: String,
    pub ssl_support_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBehavior {
    /// `None` for the default behavior
    pub path_pattern: Option<String>,
    pub target_origin_id: String,
    pub allowed_methods: Vec<String>,
    pub cached_methods: Vec<String>,
    pub forward_query_string: bool,
    pub forward_cookies: CookieForwarding,
    pub forwarded_headers: Vec<String>,
    pub min_ttl: i64,
    pub default_ttl: i64,
    pub max_ttl: i64,
    pub compress: bool,
    pub viewer_protocol_policy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomErrorResponse {
    pub error_code: i32,
    pub response_code: String,
    pub response_page_path: String,
    pub error_caching_min_ttl: i64,
}

/// Complete declarative configuration of the site distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionBlueprint {
    pub caller_reference: String,
    pub enabled: bool,
    pub ipv6_enabled: bool,
    pub aliases: Vec<String>,
    pub comment: String,
    pub origin: Origin,
    pub viewer_certificate: ViewerCertificate,
    pub default_root_object: String,
    pub default_behavior: CacheBehavior,
    pub cache_behaviors: Vec<CacheBehavior>,
    pub custom_error_responses: Vec<CustomErrorResponse>,
}

impl DistributionBlueprint {
    pub fn for_site(domain: &str, certificate_arn: &str, caller_reference: &str) -> Self {
        let origin_id = domain.to_string();
        Self {
            caller_reference: caller_reference.to_string(),
            enabled: true,
            ipv6_enabled: true,
            aliases: vec![domain.to_string()],
            comment: format!("for s3 bucket ({domain})"),
            origin: Origin {
                id: origin_id.clone(),
                domain_name: origin_domain(domain),
                origin_path: String::new(),
                http_port: 80,
                https_port: 443,
                protocol_policy: "http-only".to_string(),
                ssl_protocols: strings(&["TLSv1", "TLSv1.1", "TLSv1.2"]),
                keepalive_timeout: 5,
                read_timeout: 60,
            },
            viewer_certificate: ViewerCertificate {
                acm_certificate_arn: certificate_arn.to_string(),
                minimum_protocol_version: "TLSv1.1_2016".to_string(),
                ssl_support_method: "sni-only".to_string(),
            },
            default_root_object: DEFAULT_ROOT_OBJECT.to_string(),
            default_behavior: default_behavior(&origin_id),
            cache_behaviors: static_asset_behaviors(&origin_id, &STATIC_ASSET_RULES),
            custom_error_responses: vec![CustomErrorResponse {
                error_code: 404,
                response_code: "404".to_string(),
                response_page_path: NOT_FOUND_PAGE_PATH.to_string(),
                error_caching_min_ttl: 0,
            }],
        }
    }
}

/// Virtual-hosted domain of the bucket serving as origin
pub fn origin_domain(bucket: &str) -> String {
    format!("{bucket}.s3.amazonaws.com")
}

/// Uncached pass-through behavior
fn default_behavior(origin_id: &str) -> CacheBehavior {
    CacheBehavior {
        path_pattern: None,
        target_origin_id: origin_id.to_string(),
        allowed_methods: strings(&ALL_METHODS),
        cached_methods: strings(&CACHED_METHODS),
        forward_query_string: true,
        forward_cookies: CookieForwarding::All,
        forwarded_headers: strings(&FORWARDED_HEADERS),
        min_ttl: 0,
        default_ttl: 0,
        max_ttl: 0,
        compress: true,
        viewer_protocol_policy: "redirect-to-https".to_string(),
    }
}

pub fn static_asset_behaviors(origin_id: &str, rules: &[AssetRule]) -> Vec<CacheBehavior> {
    rules
        .iter()
        .map(|rule| CacheBehavior {
            path_pattern: Some(rule.pattern.to_string()),
            target_origin_id: origin_id.to_string(),
            allowed_methods: strings(&READ_METHODS),
            cached_methods: strings(&CACHED_METHODS),
            forward_query_string: true,
            forward_cookies: CookieForwarding::Omit,
            forwarded_headers: strings(&FORWARDED_HEADERS),
            min_ttl: rule.min_ttl,
            default_ttl: rule.default_ttl,
            max_ttl: rule.max_ttl,
            compress: true,
            viewer_protocol_policy: "redirect-to-https".to_string(),
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint() -> DistributionBlueprint {
        DistributionBlueprint::for_site(
            "www.example.com",
            "arn:aws:acm:us-east-1:123456789012:certificate/abc",
            "ref-1",
        )
    }

    #[test]
    fn test_origin_points_at_bucket() {
        let bp = blueprint();
        assert_eq!(bp.origin.id, "www.example.com");
        assert_eq!(bp.origin.domain_name, "www.example.com.s3.amazonaws.com");
        assert_eq!(bp.origin.protocol_policy, "http-only");
        assert_eq!(bp.origin.ssl_protocols.len(), 3);
    }

    #[test]
    fn test_site_defaults() {
        let bp = blueprint();
        assert_eq!(bp.aliases, vec!["www.example.com".to_string()]);
        assert_eq!(bp.default_root_object, "index.html");
        assert_eq!(
            bp.viewer_certificate.acm_certificate_arn,
            "arn:aws:acm:us-east-1:123456789012:certificate/abc"
        );
        assert_eq!(bp.caller_reference, "ref-1");
        assert_eq!(bp.comment, "for s3 bucket (www.example.com)");
    }

    #[test]
    fn test_not_found_mapping() {
        let bp = blueprint();
        assert_eq!(bp.custom_error_responses.len(), 1);
        let response = &bp.custom_error_responses[0];
        assert_eq!(response.error_code, 404);
        assert_eq!(response.response_code, "404");
        assert_eq!(response.response_page_path, "/404.html");
    }

    #[test]
    fn test_default_behavior_is_uncached() {
        let behavior = blueprint().default_behavior;
        assert_eq!(behavior.path_pattern, None);
        assert_eq!(behavior.allowed_methods.len(), 7);
        assert_eq!(behavior.forward_cookies, CookieForwarding::All);
        assert_eq!((behavior.min_ttl, behavior.default_ttl, behavior.max_ttl), (0, 0, 0));
    }

    #[test]
    fn test_static_asset_behaviors_follow_table() {
        let behaviors = blueprint().cache_behaviors;
        let patterns: Vec<_> = behaviors
            .iter()
            .filter_map(|b| b.path_pattern.as_deref())
            .collect();
        assert_eq!(patterns, vec!["*.png", "*.jpg", "*.gif", "*.css", "*.js"]);

        for behavior in &behaviors {
            assert_eq!(behavior.allowed_methods, vec!["GET", "HEAD"]);
            assert_eq!(behavior.forward_cookies, CookieForwarding::Omit);
            assert_eq!(behavior.max_ttl, 31_536_000);
            assert_eq!(behavior.default_ttl, 86_400);
            assert_eq!(behavior.target_origin_id, "www.example.com");
        }
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = [AssetRule {
            pattern: "*.woff2",
            min_ttl: 60,
            default_ttl: 120,
            max_ttl: 240,
        }];
        let behaviors = static_asset_behaviors("origin", &rules);
        assert_eq!(behaviors.len(), 1);
        assert_eq!(behaviors[0].path_pattern.as_deref(), Some("*.woff2"));
        assert_eq!(behaviors[0].min_ttl, 60);
        assert_eq!(behaviors[0].max_ttl, 240);
    }
}
