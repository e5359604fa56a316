//! Hosted zone step and delegation gate
//!
//! Nothing downstream runs until public DNS delegates the domain to exactly
//! the zone's name servers. With external DNS there is no zone and no gate.

use super::{Halt, StepContext, StepResult};
use crate::action::{Action, ActionType};
use crate::config::DnsMode;
use crate::outcome::{Failure, PendingReason};
use crate::state::{HostedZone, ResourceKind};
use crate::token::TokenPurpose;
use std::collections::BTreeSet;

/// A hosted zone whose delegation has been observed in public DNS
#[derive(Debug, Clone)]
pub struct VerifiedZone {
    zone: HostedZone,
}

impl VerifiedZone {
    pub fn id(&self) -> &str {
        &self.zone.id
    }

    pub fn name_servers(&self) -> &[String] {
        &self.zone.name_servers
    }
}

/// Where this run writes DNS records
#[derive(Debug, Clone)]
pub enum SiteDns {
    Managed(VerifiedZone),
    /// Records are handed to the operator
    External,
}

impl SiteDns {
    pub fn zone(&self) -> Option<&VerifiedZone> {
        match self {
            SiteDns::Managed(zone) => Some(zone),
            SiteDns::External => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, SiteDns::External)
    }
}

/// Outcome of comparing the zone's delegation set with public DNS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delegation {
    Verified,
    NotPublished,
    Mismatch,
}

pub fn check_delegation(expected: &[String], published: &[String]) -> Delegation {
    if published.is_empty() {
        Delegation::NotPublished
    } else if same_name_servers(expected, published) {
        Delegation::Verified
    } else {
        Delegation::Mismatch
    }
}

/// Lower-case, no trailing dot
pub fn normalize_name_server(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Set equality after normalisation
pub fn same_name_servers(expected: &[String], published: &[String]) -> bool {
    let expected: BTreeSet<_> = expected.iter().map(|n| normalize_name_server(n)).collect();
    let published: BTreeSet<_> = published.iter().map(|n| normalize_name_server(n)).collect();
    expected == published
}

pub async fn resolve(cx: &mut StepContext<'_>) -> StepResult<SiteDns> {
    match cx.config.dns {
        DnsMode::Managed => run(cx).await.map(SiteDns::Managed),
        DnsMode::External => {
            let domain = cx.domain();
            tracing::debug!(domain, "DNS is external, skipping hosted zone");
            cx.record(Action::new(
                ActionType::NoOp,
                ResourceKind::HostedZone,
                domain,
                "DNS is managed outside this tool, hosted zone skipped",
            ));
            Ok(SiteDns::External)
        }
    }
}

pub async fn run(cx: &mut StepContext<'_>) -> StepResult<VerifiedZone> {
    let config = cx.config;
    let domain = config.domain.as_str();

    let Some(zone_id) = config.zone_id.as_deref() else {
        let reference = config.token(TokenPurpose::HostedZone);
        tracing::info!(domain, "creating hosted zone");
        let zone = cx
            .backends
            .dns
            .create_hosted_zone(domain, &reference)
            .await
            .map_err(|e| Failure::create(ResourceKind::HostedZone, e))?;

        cx.record(
            Action::new(
                ActionType::Create,
                ResourceKind::HostedZone,
                &zone.id,
                format!("created hosted zone for {domain}"),
            )
            .with_detail("name_servers", serde_json::json!(zone.name_servers)),
        );
        return Err(Halt::Pending(PendingReason::ZoneCreated {
            zone_id: zone.id,
            name_servers: zone.name_servers,
        }));
    };

    let probe = cx.probe();
    let zone = probe.hosted_zone(zone_id).await?;
    let published = probe.published_name_servers(domain).await?;

    match check_delegation(&zone.name_servers, &published) {
        Delegation::Verified => {
            cx.record(Action::new(
                ActionType::NoOp,
                ResourceKind::HostedZone,
                &zone.id,
                "hosted zone exists and delegation matches",
            ));
            Ok(VerifiedZone { zone })
        }
        Delegation::NotPublished => {
            tracing::warn!(domain, "no NS records published");
            cx.record(Action::new(
                ActionType::Wait,
                ResourceKind::HostedZone,
                &zone.id,
                "waiting for NS records to be published",
            ));
            Err(Halt::Pending(PendingReason::NameServersNotPublished {
                expected: zone.name_servers,
            }))
        }
        Delegation::Mismatch => {
            tracing::warn!(domain, expected = ?zone.name_servers, ?published, "NS mismatch");
            cx.record(Action::new(
                ActionType::Wait,
                ResourceKind::HostedZone,
                &zone.id,
                "waiting for NS records to match the hosted zone",
            ));
            Err(Halt::Pending(PendingReason::NameServersMismatch {
                expected: zone.name_servers,
                published,
            }))
        }
    }
}
