//! Cloud collaborator error types

use thiserror::Error;

/// Errors returned by the storage, certificate, CDN and DNS collaborators
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether a create call hit a resource that is already present
    pub fn is_already_exists(&self) -> bool {
        matches!(self, CloudError::ResourceAlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
