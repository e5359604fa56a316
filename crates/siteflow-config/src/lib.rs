//! SiteFlow configuration
//!
//! Settings are layered, lowest to highest:
//!
//! 1. `.env` in the working directory, or the file passed explicitly
//!    (`KEY=VALUE` lines)
//! 2. process environment
//! 3. [`Overrides`] from the command line
//!
//! Empty values count as unset at every layer, so a blank environment
//! variable leaves the `.env` value in effect.

pub mod error;

pub use error::*;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const KEY_DOMAIN: &str = "SITE_FQDN";
pub const KEY_REGION: &str = "AWS_REGION";
pub const KEY_ZONE_ID: &str = "AWS_ROUTE53_ZONE_ID";
pub const KEY_CERTIFICATE_ARN: &str = "AWS_CERTIFICATE_ARN";
pub const KEY_DISTRIBUTION_ID: &str = "AWS_CLOUDFRONT_ID";
pub const KEY_ASSETS_DIR: &str = "SITE_ASSETS_DIR";
pub const KEY_TOKEN_SALT: &str = "SITE_TOKEN_SALT";
pub const KEY_REPAIR_ALIAS: &str = "SITE_REPAIR_ALIAS";
pub const KEY_DNS: &str = "SITE_DNS";

/// Every key read from the environment
pub const KEYS: [&str; 9] = [
    KEY_DOMAIN,
    KEY_REGION,
    KEY_ZONE_ID,
    KEY_CERTIFICATE_ARN,
    KEY_DISTRIBUTION_ID,
    KEY_ASSETS_DIR,
    KEY_TOKEN_SALT,
    KEY_REPAIR_ALIAS,
    KEY_DNS,
];

pub const DEFAULT_REGION: &str = "ap-northeast-1";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Who serves the site's DNS records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsMode {
    /// Hosted zone, validation record and alias are managed in Route 53
    #[default]
    Route53,
    /// Records are added by hand at another DNS provider
    External,
}

impl DnsMode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "route53" => Ok(DnsMode::Route53),
            "external" => Ok(DnsMode::External),
            _ => Err(invalid(KEY_DNS, raw, "route53 / external を指定してください")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub domain: String,
    pub region: String,
    pub zone_id: Option<String>,
    pub certificate_arn: Option<String>,
    pub distribution_id: Option<String>,
    /// Directory holding `index.html` and `404.html`
    pub assets_dir: PathBuf,
    pub token_salt: String,
    pub repair_alias: bool,
    pub dns: DnsMode,
}

/// Command-line values; `None` leaves the lower layers in effect
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub domain: Option<String>,
    pub region: Option<String>,
    pub zone_id: Option<String>,
    pub certificate_arn: Option<String>,
    pub distribution_id: Option<String>,
    pub assets_dir: Option<PathBuf>,
    /// Only ever switches alias repair on
    pub repair_alias: bool,
    pub dns: Option<String>,
}

/// Load from `.env` (or `env_file`) and the process environment
pub fn load(env_file: Option<&Path>) -> Result<SiteConfig> {
    load_with(env_file, &Overrides::default())
}

pub fn load_with(env_file: Option<&Path>, overrides: &Overrides) -> Result<SiteConfig> {
    let file = match env_file {
        // An explicitly named file must exist
        Some(path) => File::from(path).format(FileFormat::Ini).required(true),
        None => File::new(DEFAULT_ENV_FILE, FileFormat::Ini).required(false),
    };
    let layers = Layers {
        file: Config::builder().add_source(file).build()?,
        env: Config::builder().add_source(Environment::default()).build()?,
    };

    let lookup = |key: &str| -> Result<Option<String>> { layers.value(key) };
    let pick = |flag: &Option<String>, key: &str| -> Result<Option<String>> {
        match non_empty(flag.as_deref()) {
            Some(v) => Ok(Some(v)),
            None => lookup(key),
        }
    };

    let domain = pick(&overrides.domain, KEY_DOMAIN)?
        .ok_or_else(|| ConfigError::MissingKey(KEY_DOMAIN.to_string()))?;
    validate_domain(&domain)?;

    let assets_dir = match &overrides.assets_dir {
        Some(dir) => dir.clone(),
        None => lookup(KEY_ASSETS_DIR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let repair_alias = overrides.repair_alias
        || lookup(KEY_REPAIR_ALIAS)?
            .map(|raw| parse_bool(KEY_REPAIR_ALIAS, &raw))
            .transpose()?
            .unwrap_or(false);

    let dns = pick(&overrides.dns, KEY_DNS)?
        .map(|raw| DnsMode::parse(&raw))
        .transpose()?
        .unwrap_or_default();

    let config = SiteConfig {
        domain,
        region: pick(&overrides.region, KEY_REGION)?.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        zone_id: pick(&overrides.zone_id, KEY_ZONE_ID)?,
        certificate_arn: pick(&overrides.certificate_arn, KEY_CERTIFICATE_ARN)?,
        distribution_id: pick(&overrides.distribution_id, KEY_DISTRIBUTION_ID)?,
        assets_dir,
        token_salt: lookup(KEY_TOKEN_SALT)?.unwrap_or_default(),
        repair_alias,
        dns,
    };
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// The `config` crate lower-cases environment keys but keeps file keys as
/// written, so each layer is queried on its own.
struct Layers {
    file: Config,
    env: Config,
}

impl Layers {
    /// Environment first, then the file under its exact or lower-cased key
    fn value(&self, key: &str) -> Result<Option<String>> {
        let lower = key.to_ascii_lowercase();
        if let Some(v) = get(&self.env, &lower)? {
            return Ok(Some(v));
        }
        match get(&self.file, key)? {
            Some(v) => Ok(Some(v)),
            None => get(&self.file, &lower),
        }
    }
}

/// Blank values read as unset
fn get(layer: &Config, key: &str) -> Result<Option<String>> {
    match layer.get_string(key) {
        Ok(raw) => Ok(non_empty(Some(&raw))),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_domain(domain: &str) -> Result<()> {
    if domain.contains("://") || domain.contains('/') {
        return Err(invalid(KEY_DOMAIN, domain, "スキームやパスを含めず FQDN のみを指定してください"));
    }
    if domain.contains(char::is_whitespace) || !domain.contains('.') {
        return Err(invalid(KEY_DOMAIN, domain, "FQDN (例: www.example.com) を指定してください"));
    }
    Ok(())
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "true / false を指定してください")),
    }
}
