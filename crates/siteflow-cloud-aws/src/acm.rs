//! ACM certificate authority
//!
//! CloudFront only accepts certificates from `us-east-1`, so the client
//! handed in here must be bound to that region.

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_acm::Client;
use aws_sdk_acm::types::{
    CertificateOptions, CertificateTransparencyLoggingPreference, DomainValidation, RecordType,
    ValidationMethod,
};
use siteflow_cloud::{
    CertificateAuthority, CertificateDetail, CertificateRequest, CertificateStatus,
    CertificateSummary, ValidationRecord,
};

pub const CERTIFICATE_REGION: &str = "us-east-1";

pub struct AcmCertificates {
    client: Client,
}

impl AcmCertificates {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list_all(&self) -> Result<Vec<CertificateSummary>> {
        let mut summaries = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_certificates()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AwsError::sdk("ListCertificates", e))?;

            let page: Option<&[aws_sdk_acm::types::CertificateSummary]> =
                output.certificate_summary_list().into();
            for summary in page.unwrap_or_default() {
                if let (Some(arn), Some(domain)) =
                    (summary.certificate_arn(), summary.domain_name())
                {
                    summaries.push(CertificateSummary {
                        arn: arn.to_string(),
                        domain: domain.to_string(),
                    });
                }
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(summaries)
    }

    async fn request(&self, request: &CertificateRequest) -> Result<String> {
        let logging = if request.transparency_logging {
            "ENABLED"
        } else {
            "DISABLED"
        };
        let output = self
            .client
            .request_certificate()
            .domain_name(&request.domain)
            .validation_method(ValidationMethod::from("DNS"))
            .idempotency_token(&request.idempotency_token)
            .options(
                CertificateOptions::builder()
                    .certificate_transparency_logging_preference(
                        CertificateTransparencyLoggingPreference::from(logging),
                    )
                    .build(),
            )
            .send()
            .await
            .map_err(|e| AwsError::sdk("RequestCertificate", e))?;

        output
            .certificate_arn()
            .map(str::to_string)
            .ok_or_else(|| AwsError::missing("RequestCertificate", "CertificateArn"))
    }

    async fn describe(&self, arn: &str) -> siteflow_cloud::Result<CertificateDetail> {
        let output = self
            .client
            .describe_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| AwsError::sdk("DescribeCertificate", e))?;

        let certificate = output
            .certificate()
            .ok_or_else(|| AwsError::missing("DescribeCertificate", "Certificate"))?;
        let status = certificate
            .status()
            .ok_or_else(|| AwsError::missing("DescribeCertificate", "Status"))?;
        let options: Option<&[DomainValidation]> = certificate.domain_validation_options().into();

        Ok(CertificateDetail {
            arn: certificate.certificate_arn().unwrap_or(arn).to_string(),
            domain: certificate.domain_name().unwrap_or_default().to_string(),
            status: status.as_str().parse::<CertificateStatus>()?,
            validation_record: options.unwrap_or_default().iter().find_map(validation_record),
        })
    }
}

fn validation_record(option: &DomainValidation) -> Option<ValidationRecord> {
    let record = option.resource_record()?;
    let name: Option<&str> = record.name().into();
    let value: Option<&str> = record.value().into();
    let record_type: Option<&RecordType> = record.r#type().into();
    Some(ValidationRecord {
        name: name?.to_string(),
        record_type: record_type?.as_str().to_string(),
        value: value?.to_string(),
    })
}

#[async_trait]
impl CertificateAuthority for AcmCertificates {
    async fn list_certificates(&self) -> siteflow_cloud::Result<Vec<CertificateSummary>> {
        Ok(self.list_all().await?)
    }

    async fn request_certificate(
        &self,
        request: &CertificateRequest,
    ) -> siteflow_cloud::Result<String> {
        tracing::debug!(domain = %request.domain, "RequestCertificate");
        Ok(self.request(request).await?)
    }

    async fn describe_certificate(&self, arn: &str) -> siteflow_cloud::Result<CertificateDetail> {
        self.describe(arn).await
    }
}
