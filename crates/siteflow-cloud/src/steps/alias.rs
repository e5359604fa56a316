//! Alias record step
//!
//! The alias is written when the distribution is created in the same run.
//! A pre-existing distribution leaves the record untouched unless
//! `repair_alias` is set, in which case it is upserted. External DNS never
//! writes it; the run reports the CNAME the operator has to add.

use super::distribution::ProvisionedDistribution;
use super::zone::SiteDns;
use super::{StepContext, StepResult};
use crate::action::{Action, ActionType};
use crate::outcome::Failure;
use crate::state::{ChangeAction, RecordSet, ResourceKind};

/// Returns whether the record was written in this run
pub async fn run(
    cx: &mut StepContext<'_>,
    dns: &SiteDns,
    distribution: &ProvisionedDistribution,
) -> StepResult<bool> {
    let config = cx.config;
    let domain = config.domain.as_str();

    let Some(zone) = dns.zone() else {
        cx.record(Action::new(
            ActionType::NoOp,
            ResourceKind::AliasRecord,
            domain,
            format!(
                "DNS is external, add {domain} CNAME {} by hand",
                distribution.domain_name()
            ),
        ));
        return Ok(false);
    };

    let (change, action_type) = if distribution.created() {
        (ChangeAction::Create, ActionType::Create)
    } else if config.repair_alias {
        (ChangeAction::Upsert, ActionType::Update)
    } else {
        cx.record(Action::new(
            ActionType::NoOp,
            ResourceKind::AliasRecord,
            domain,
            "distribution pre-existed, alias left as is",
        ));
        return Ok(false);
    };

    let record = RecordSet::cloudfront_alias(domain, distribution.domain_name());
    tracing::info!(
        domain,
        target = distribution.domain_name(),
        action = change.as_str(),
        "writing alias record"
    );
    cx.backends
        .dns
        .change_record_set(zone.id(), change, &record)
        .await
        .map_err(|e| Failure::create(ResourceKind::AliasRecord, e))?;
    cx.record(
        Action::new(
            action_type,
            ResourceKind::AliasRecord,
            domain,
            format!("alias {domain} -> {}", distribution.domain_name()),
        )
        .with_detail("zone_id", serde_json::json!(zone.id())),
    );

    Ok(true)
}
