//! Idempotency tokens and caller references
//!
//! Providers deduplicate create requests that carry the same token, so each
//! logical request gets its own token derived from the domain and the
//! purpose. Changing the salt forces a fresh request.

use sha2::{Digest, Sha256};
use std::fmt;

/// Longest token every provider accepts (ACM caps idempotency tokens at 32)
pub const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    HostedZone,
    Certificate,
    Distribution,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::HostedZone => "hosted-zone",
            TokenPurpose::Certificate => "certificate",
            TokenPurpose::Distribution => "distribution",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `hex(sha256(domain \0 purpose \0 salt))` truncated to [`TOKEN_LEN`]
pub fn derive_token(domain: &str, purpose: TokenPurpose, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update([0u8]);
    hasher.update(purpose.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(salt.as_bytes());
    let mut token = hex::encode(hasher.finalize());
    token.truncate(TOKEN_LEN);
    token
}
