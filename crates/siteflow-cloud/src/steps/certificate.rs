//! Certificate step
//!
//! ```text
//! ABSENT ──request──▶ PENDING_VALIDATION ──(CA polls DNS)──▶ ISSUED
//!                            │
//!                            └──▶ INACTIVE | EXPIRED | VALIDATION_TIMED_OUT | REVOKED | FAILED
//! ```
//!
//! Status transitions belong to the certificate authority. A run observes
//! the status once and either proceeds, halts pending, or halts fatally.

use super::zone::{SiteDns, VerifiedZone};
use super::{Halt, StepContext, StepResult};
use crate::action::{Action, ActionType};
use crate::outcome::{Failure, PendingReason};
use crate::state::{
    CertificateDetail, CertificateDisposition, CertificateRequest, ChangeAction, ResourceKind,
    ValidationRecord,
};
use crate::token::TokenPurpose;

/// Proof that the certificate was observed `ISSUED` in this run
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    arn: String,
}

impl IssuedCertificate {
    pub fn arn(&self) -> &str {
        &self.arn
    }
}

pub async fn run(cx: &mut StepContext<'_>, dns: &SiteDns) -> StepResult<IssuedCertificate> {
    let arn = resolve_arn(cx).await?;

    let detail = cx
        .backends
        .certificates
        .describe_certificate(&arn)
        .await
        .map_err(|e| Failure::probe(ResourceKind::Certificate, e))?;
    tracing::debug!(arn = %detail.arn, status = %detail.status, "described certificate");

    evaluate(cx, dns, detail).await
}

/// Configured ARN, then lookup by domain, then a fresh request
async fn resolve_arn(cx: &mut StepContext<'_>) -> StepResult<String> {
    let config = cx.config;
    let domain = config.domain.as_str();

    if let Some(arn) = config.certificate_arn.as_deref() {
        cx.record(Action::new(
            ActionType::NoOp,
            ResourceKind::Certificate,
            arn,
            "using configured certificate",
        ));
        return Ok(arn.to_string());
    }

    if let Some(arn) = cx.probe().find_certificate(domain).await? {
        cx.record(Action::new(
            ActionType::NoOp,
            ResourceKind::Certificate,
            &arn,
            "certificate exists",
        ));
        return Ok(arn);
    }

    let request = CertificateRequest {
        domain: domain.to_string(),
        idempotency_token: config.token(TokenPurpose::Certificate),
        transparency_logging: false,
    };
    tracing::info!(domain, "requesting certificate");
    let arn = cx
        .backends
        .certificates
        .request_certificate(&request)
        .await
        .map_err(|e| Failure::create(ResourceKind::Certificate, e))?;
    cx.record(Action::new(
        ActionType::Create,
        ResourceKind::Certificate,
        &arn,
        format!("requested DNS-validated certificate for {domain}"),
    ));
    Ok(arn)
}

async fn evaluate(
    cx: &mut StepContext<'_>,
    dns: &SiteDns,
    detail: CertificateDetail,
) -> StepResult<IssuedCertificate> {
    match detail.status.disposition() {
        CertificateDisposition::Proceed => Ok(IssuedCertificate { arn: detail.arn }),
        CertificateDisposition::AwaitValidation => {
            let Some(record) = detail.validation_record else {
                cx.record(Action::new(
                    ActionType::Wait,
                    ResourceKind::Certificate,
                    &detail.arn,
                    "waiting for the validation record to be generated",
                ));
                return Err(Halt::Pending(PendingReason::ValidationRecordNotReady {
                    certificate_arn: detail.arn,
                }));
            };

            let SiteDns::Managed(zone) = dns else {
                tracing::warn!(record = %record, "validation record must be added by hand");
                cx.record(
                    Action::new(
                        ActionType::Wait,
                        ResourceKind::ValidationRecord,
                        &record.name,
                        "add the validation record at the DNS provider",
                    )
                    .with_detail("validation_record", serde_json::json!(record)),
                );
                return Err(Halt::Pending(PendingReason::ManualValidation {
                    certificate_arn: detail.arn,
                    record,
                }));
            };

            ensure_validation_record(cx, zone, &record).await?;
            cx.record(Action::new(
                ActionType::Wait,
                ResourceKind::Certificate,
                &detail.arn,
                "waiting for the certificate authority to validate",
            ));
            Err(Halt::Pending(PendingReason::CertificateValidation {
                certificate_arn: detail.arn,
                record,
            }))
        }
        CertificateDisposition::Fatal => Err(Halt::Failed(Failure::terminal(
            ResourceKind::Certificate,
            format!("certificate {} is {}", detail.arn, detail.status),
        ))),
    }
}

/// Create the validation CNAME, tolerating an identical record already present
async fn ensure_validation_record(
    cx: &mut StepContext<'_>,
    zone: &VerifiedZone,
    record: &ValidationRecord,
) -> StepResult<()> {
    let result = cx
        .backends
        .dns
        .change_record_set(zone.id(), ChangeAction::Create, &record.to_record_set())
        .await;

    match result {
        Ok(()) => {
            tracing::info!(name = %record.name, value = %record.value, "created validation record");
            cx.record(
                Action::new(
                    ActionType::Create,
                    ResourceKind::ValidationRecord,
                    &record.name,
                    format!("created validation record {record}"),
                )
                .with_detail("zone_id", serde_json::json!(zone.id())),
            );
            Ok(())
        }
        Err(e) if e.is_already_exists() => {
            cx.record(Action::new(
                ActionType::NoOp,
                ResourceKind::ValidationRecord,
                &record.name,
                "validation record exists",
            ));
            Ok(())
        }
        Err(e) => Err(Halt::Failed(Failure::create(ResourceKind::ValidationRecord, e))),
    }
}
