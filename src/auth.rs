//! Editor identity verification.
//!
//! The publication pipeline never depends on a specific credential scheme.
//! It asks a [`CredentialVerifier`] for a [`Principal`] and uses the
//! principal's author handle as the byline. The stock implementation checks
//! a single env-configured id/password pair; swapping in a real identity
//! provider means implementing one trait.

use crate::article::{Author, resolve_author};
use crate::config::AdminSection;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("admin password is not configured; set ADMIN_PASSWORD in the environment")]
    NotConfigured,
    #[error("invalid press credentials")]
    Denied,
}

/// A verified publishing identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub author: &'static Author,
}

/// Verifies an id/secret pair and yields the publishing principal.
pub trait CredentialVerifier {
    fn verify(&self, id: &str, secret: &str) -> Result<Principal, AuthError>;
}

/// Checks against the single admin pair from the environment. An unset
/// password refuses everything rather than falling back to a default.
pub struct StaticCredentialVerifier {
    admin_id: Option<String>,
    admin_password: Option<String>,
    /// Byline for the verified editor.
    author_handle: String,
}

impl StaticCredentialVerifier {
    pub fn new(admin: &AdminSection) -> Self {
        Self {
            admin_id: admin.id.clone(),
            admin_password: admin.password.clone(),
            author_handle: "@skulkarni".to_string(),
        }
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify(&self, id: &str, secret: &str) -> Result<Principal, AuthError> {
        let (Some(admin_id), Some(admin_password)) = (&self.admin_id, &self.admin_password)
        else {
            return Err(AuthError::NotConfigured);
        };
        if admin_password.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        if id == admin_id && secret == admin_password {
            Ok(Principal {
                author: resolve_author(&self.author_handle),
            })
        } else {
            Err(AuthError::Denied)
        }
    }
}
