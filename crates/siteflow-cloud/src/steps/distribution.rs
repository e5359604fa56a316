//! CDN distribution step

use super::certificate::IssuedCertificate;
use super::{StepContext, StepResult};
use crate::action::{Action, ActionType};
use crate::blueprint::DistributionBlueprint;
use crate::outcome::Failure;
use crate::state::ResourceKind;
use crate::token::TokenPurpose;

/// A distribution that exists and serves the site's alias
#[derive(Debug, Clone)]
pub struct ProvisionedDistribution {
    id: String,
    domain_name: String,
    created: bool,
}

impl ProvisionedDistribution {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Edge domain the alias record points at
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// True when this run created the distribution
    pub fn created(&self) -> bool {
        self.created
    }
}

pub async fn run(
    cx: &mut StepContext<'_>,
    certificate: &IssuedCertificate,
) -> StepResult<ProvisionedDistribution> {
    let config = cx.config;
    let domain = config.domain.as_str();
    let probe = cx.probe();

    let existing = match config.distribution_id.as_deref() {
        Some(id) => Some(id.to_string()),
        None => probe.find_distribution(domain).await?,
    };

    if let Some(id) = existing {
        let distribution = probe.distribution(&id).await?;
        cx.record(
            Action::new(
                ActionType::NoOp,
                ResourceKind::Distribution,
                &distribution.id,
                "distribution exists",
            )
            .with_detail("status", serde_json::json!(distribution.status)),
        );
        return Ok(ProvisionedDistribution {
            id: distribution.id,
            domain_name: distribution.domain_name,
            created: false,
        });
    }

    let caller_reference = config.token(TokenPurpose::Distribution);
    let blueprint = DistributionBlueprint::for_site(domain, certificate.arn(), &caller_reference);
    tracing::info!(domain, certificate = certificate.arn(), "creating distribution");
    let distribution = cx
        .backends
        .cdn
        .create_distribution(&blueprint)
        .await
        .map_err(|e| Failure::create(ResourceKind::Distribution, e))?;
    cx.record(
        Action::new(
            ActionType::Create,
            ResourceKind::Distribution,
            &distribution.id,
            format!("created distribution for {domain}"),
        )
        .with_detail("domain_name", serde_json::json!(distribution.domain_name)),
    );

    Ok(ProvisionedDistribution {
        id: distribution.id,
        domain_name: distribution.domain_name,
        created: true,
    })
}
