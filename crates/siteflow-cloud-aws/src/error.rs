//! AWS collaborator error types

use aws_sdk_s3::error::{BuildError, DisplayErrorContext};
use siteflow_cloud::CloudError;
use thiserror::Error;

/// Markers AWS puts in credential and permission errors
const AUTH_MARKERS: [&str; 5] = [
    "AccessDenied",
    "InvalidClientTokenId",
    "ExpiredToken",
    "UnrecognizedClientException",
    "SignatureDoesNotMatch",
];

/// Markers of a create call hitting an existing resource
const CONFLICT_MARKERS: [&str; 2] = ["already exists", "AlreadyExists"];

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{operation} failed: {message}")]
    Sdk {
        operation: &'static str,
        message: String,
    },

    #[error("invalid request: {0}")]
    Build(#[from] BuildError),

    #[error("{operation} response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}

impl AwsError {
    /// Wrap an SDK error, keeping the full provider diagnostic
    pub fn sdk<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error,
    {
        AwsError::Sdk {
            operation,
            message: DisplayErrorContext(err).to_string(),
        }
    }

    pub fn missing(operation: &'static str, field: &'static str) -> Self {
        AwsError::MissingField { operation, field }
    }
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match &err {
            AwsError::Sdk { message, .. } => {
                if CONFLICT_MARKERS.iter().any(|m| message.contains(m)) {
                    CloudError::ResourceAlreadyExists(err.to_string())
                } else if AUTH_MARKERS.iter().any(|m| message.contains(m)) {
                    CloudError::AuthenticationFailed(err.to_string())
                } else {
                    CloudError::ApiError(err.to_string())
                }
            }
            AwsError::Build(_) => CloudError::InvalidConfig(err.to_string()),
            AwsError::MissingField { .. } => CloudError::InvalidResponse(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
