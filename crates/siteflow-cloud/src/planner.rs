//! Dry-run planner
//!
//! Walks the same order as a real run using probes only. Where a real run
//! would halt pending, the plan ends with a `Wait` action. Every write the
//! run would make before halting is listed, including the validation record.

use crate::action::{Action, ActionType, Plan};
use crate::config::{ConvergeConfig, DnsMode};
use crate::outcome::Failure;
use crate::probe::ResourceProbe;
use crate::provider::Backends;
use crate::state::{CertificateDisposition, ResourceKind};
use crate::steps::storage::SEED_OBJECTS;
use crate::steps::zone::{Delegation, check_delegation};

/// Whether the walk may continue past a resource
enum Gate {
    Open,
    Closed,
}

pub async fn plan(config: &ConvergeConfig, backends: &Backends) -> Result<Plan, Failure> {
    let probe = ResourceProbe::new(backends);
    let mut actions = Vec::new();

    if let Gate::Closed = plan_zone(config, &probe, &mut actions).await? {
        return Ok(Plan::new(actions));
    }
    plan_storage(config, &probe, &mut actions).await?;
    if let Gate::Closed = plan_certificate(config, &probe, backends, &mut actions).await? {
        return Ok(Plan::new(actions));
    }
    plan_distribution(config, &probe, &mut actions).await?;

    Ok(Plan::new(actions))
}

async fn plan_zone(
    config: &ConvergeConfig,
    probe: &ResourceProbe<'_>,
    actions: &mut Vec<Action>,
) -> Result<Gate, Failure> {
    let domain = config.domain.as_str();

    if config.dns == DnsMode::External {
        actions.push(Action::new(
            ActionType::NoOp,
            ResourceKind::HostedZone,
            domain,
            "DNS is managed outside this tool, hosted zone skipped",
        ));
        return Ok(Gate::Open);
    }

    let Some(zone_id) = config.zone_id.as_deref() else {
        actions.push(Action::new(
            ActionType::Create,
            ResourceKind::HostedZone,
            domain,
            format!("create hosted zone for {domain}"),
        ));
        actions.push(Action::new(
            ActionType::Wait,
            ResourceKind::HostedZone,
            domain,
            "install the new name servers at the registrar",
        ));
        return Ok(Gate::Closed);
    };

    let zone = probe.hosted_zone(zone_id).await?;
    let published = probe.published_name_servers(domain).await?;
    match check_delegation(&zone.name_servers, &published) {
        Delegation::Verified => {
            actions.push(Action::new(
                ActionType::NoOp,
                ResourceKind::HostedZone,
                zone_id,
                "hosted zone exists and delegation matches",
            ));
            Ok(Gate::Open)
        }
        Delegation::NotPublished | Delegation::Mismatch => {
            actions.push(
                Action::new(
                    ActionType::Wait,
                    ResourceKind::HostedZone,
                    zone_id,
                    "delegation does not match the hosted zone",
                )
                .with_detail("expected", serde_json::json!(zone.name_servers))
                .with_detail("published", serde_json::json!(published)),
            );
            Ok(Gate::Closed)
        }
    }
}

async fn plan_storage(
    config: &ConvergeConfig,
    probe: &ResourceProbe<'_>,
    actions: &mut Vec<Action>,
) -> Result<(), Failure> {
    let bucket = config.bucket();
    if probe.bucket_exists(bucket).await? {
        actions.push(Action::new(
            ActionType::NoOp,
            ResourceKind::Bucket,
            bucket,
            "bucket exists",
        ));
        return Ok(());
    }

    actions.push(Action::new(
        ActionType::Create,
        ResourceKind::Bucket,
        bucket,
        "create bucket",
    ));
    for key in SEED_OBJECTS {
        actions.push(Action::new(
            ActionType::Create,
            ResourceKind::Object,
            format!("{bucket}/{key}"),
            format!("upload {key}"),
        ));
    }
    Ok(())
}

async fn plan_certificate(
    config: &ConvergeConfig,
    probe: &ResourceProbe<'_>,
    backends: &Backends,
    actions: &mut Vec<Action>,
) -> Result<Gate, Failure> {
    let domain = config.domain.as_str();
    // Past the zone gate a managed run always has a zone id
    let zone_id = match config.dns {
        DnsMode::Managed => config.zone_id.as_deref(),
        DnsMode::External => None,
    };

    let arn = match config.certificate_arn.clone() {
        Some(arn) => Some(arn),
        None => probe.find_certificate(domain).await?,
    };
    let Some(arn) = arn else {
        actions.push(Action::new(
            ActionType::Create,
            ResourceKind::Certificate,
            domain,
            format!("request DNS-validated certificate for {domain}"),
        ));
        let wait = match zone_id {
            Some(zone_id) => {
                actions.push(
                    Action::new(
                        ActionType::Create,
                        ResourceKind::ValidationRecord,
                        domain,
                        "create validation record once the certificate authority issues it",
                    )
                    .with_detail("zone_id", serde_json::json!(zone_id)),
                );
                "wait for certificate validation"
            }
            None => "add the validation record at the DNS provider",
        };
        actions.push(Action::new(
            ActionType::Wait,
            ResourceKind::Certificate,
            domain,
            wait,
        ));
        return Ok(Gate::Closed);
    };

    let detail = backends
        .certificates
        .describe_certificate(&arn)
        .await
        .map_err(|e| Failure::probe(ResourceKind::Certificate, e))?;

    match detail.status.disposition() {
        CertificateDisposition::Proceed => {
            actions.push(Action::new(
                ActionType::NoOp,
                ResourceKind::Certificate,
                &arn,
                "certificate issued",
            ));
            Ok(Gate::Open)
        }
        CertificateDisposition::AwaitValidation => {
            let mut wait = Action::new(
                ActionType::Wait,
                ResourceKind::Certificate,
                &arn,
                "wait for certificate validation",
            );
            if let Some(record) = &detail.validation_record {
                match zone_id {
                    Some(zone_id) => {
                        let set = record.to_record_set();
                        let exists = probe
                            .record_exists(zone_id, ResourceKind::ValidationRecord, &set)
                            .await?;
                        let action = if exists {
                            Action::new(
                                ActionType::NoOp,
                                ResourceKind::ValidationRecord,
                                &record.name,
                                "validation record exists",
                            )
                        } else {
                            Action::new(
                                ActionType::Create,
                                ResourceKind::ValidationRecord,
                                &record.name,
                                format!("create validation record {record}"),
                            )
                            .with_detail("zone_id", serde_json::json!(zone_id))
                        };
                        actions.push(action);
                    }
                    None => {
                        wait = Action::new(
                            ActionType::Wait,
                            ResourceKind::ValidationRecord,
                            &record.name,
                            "add the validation record at the DNS provider",
                        );
                    }
                }
                wait = wait.with_detail("validation_record", serde_json::json!(record));
            }
            actions.push(wait);
            Ok(Gate::Closed)
        }
        CertificateDisposition::Fatal => Err(Failure::terminal(
            ResourceKind::Certificate,
            format!("certificate {arn} is {}", detail.status),
        )),
    }
}

async fn plan_distribution(
    config: &ConvergeConfig,
    probe: &ResourceProbe<'_>,
    actions: &mut Vec<Action>,
) -> Result<(), Failure> {
    let domain = config.domain.as_str();

    let existing = match config.distribution_id.clone() {
        Some(id) => Some(id),
        None => probe.find_distribution(domain).await?,
    };

    match existing {
        Some(id) => {
            let distribution = probe.distribution(&id).await?;
            actions.push(Action::new(
                ActionType::NoOp,
                ResourceKind::Distribution,
                &distribution.id,
                "distribution exists",
            ));
            let alias = if config.dns == DnsMode::External {
                Action::new(
                    ActionType::NoOp,
                    ResourceKind::AliasRecord,
                    domain,
                    format!(
                        "DNS is external, add {domain} CNAME {} by hand",
                        distribution.domain_name
                    ),
                )
            } else if config.repair_alias {
                Action::new(
                    ActionType::Update,
                    ResourceKind::AliasRecord,
                    domain,
                    format!("upsert alias {domain} -> {}", distribution.domain_name),
                )
            } else {
                Action::new(
                    ActionType::NoOp,
                    ResourceKind::AliasRecord,
                    domain,
                    "distribution pre-existed, alias left as is",
                )
            };
            actions.push(alias);
        }
        None => {
            actions.push(Action::new(
                ActionType::Create,
                ResourceKind::Distribution,
                domain,
                format!("create distribution for {domain}"),
            ));
            actions.push(match config.dns {
                DnsMode::Managed => Action::new(
                    ActionType::Create,
                    ResourceKind::AliasRecord,
                    domain,
                    format!("alias {domain} -> new distribution"),
                ),
                DnsMode::External => Action::new(
                    ActionType::NoOp,
                    ResourceKind::AliasRecord,
                    domain,
                    format!("DNS is external, add {domain} CNAME to the new distribution by hand"),
                ),
            });
        }
    }
    Ok(())
}
