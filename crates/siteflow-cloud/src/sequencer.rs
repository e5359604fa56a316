//! Dependency sequencer
//!
//! Runs the steps strictly in dependency order. Each step's output is the
//! input the next one needs, so a later step cannot start before the
//! earlier one succeeded.

use crate::outcome::SiteEndpoint;
use crate::state::RecordSet;
use crate::steps::{StepContext, StepResult, alias, certificate, distribution, storage, zone};

pub async fn run(cx: &mut StepContext<'_>) -> StepResult<SiteEndpoint> {
    let dns = zone::resolve(cx).await?;
    storage::run(cx).await?;
    let certificate = certificate::run(cx, &dns).await?;
    let distribution = distribution::run(cx, &certificate).await?;
    let alias_written = alias::run(cx, &dns, &distribution).await?;

    let manual_record = dns
        .is_external()
        .then(|| RecordSet::cname(cx.domain(), distribution.domain_name()));

    Ok(SiteEndpoint {
        distribution_id: distribution.id().to_string(),
        distribution_domain: distribution.domain_name().to_string(),
        alias_written,
        manual_record,
    })
}
