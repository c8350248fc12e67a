//! Runtime configuration, loaded from the environment.
//!
//! Every deployment knob is an environment variable with the production
//! default baked in where one exists. Loading never fails on *absent*
//! secrets — degraded modes are part of the contract:
//!
//! - Missing storage key pair → every sign request fails with a
//!   server-configuration error (HTTP 500), but the process runs.
//! - Missing database path → the store's connectivity probe reports
//!   disconnected and persistence-dependent actions are disabled.
//! - Missing admin pair → credential verification always fails.
//!
//! The rest of the crate never reads the environment directly; the issuer
//! and the store consume the resolved structs returned by the accessors
//! here, so no component branches on deployment context.

use confique::Config;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration load error: {0}")]
    Load(#[from] confique::Error),
    #[error("server configuration error: missing storage credentials")]
    MissingStorageCredentials,
}

/// All environment-supplied settings.
#[derive(Config, Debug, Clone)]
pub struct Settings {
    #[config(nested)]
    pub storage: StorageSection,
    #[config(nested)]
    pub database: DatabaseSection,
    #[config(nested)]
    pub admin: AdminSection,
}

/// Object-storage settings (Cloudflare R2 over the S3 wire surface).
#[derive(Config, Debug, Clone)]
pub struct StorageSection {
    /// Account id — fixed per deployment, so it carries a default like the
    /// bucket and public base.
    #[config(env = "R2_ACCOUNT_ID", default = "d2ee658194859b79564077fad96456cc")]
    pub account_id: String,
    #[config(env = "R2_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,
    #[config(env = "R2_SECRET_ACCESS_KEY")]
    pub secret_access_key: Option<String>,
    #[config(env = "R2_BUCKET_NAME", default = "telugu-sonawale")]
    pub bucket: String,
    /// Base of the public read URL for uploaded objects.
    #[config(
        env = "R2_PUBLIC_URL",
        default = "https://pub-0a5d163a427242319da103daaf44fbf3.r2.dev"
    )]
    pub public_base: String,
}

#[derive(Config, Debug, Clone)]
pub struct DatabaseSection {
    /// Path of the SQLite database file. Absent → store runs disconnected.
    #[config(env = "DATABASE_PATH")]
    pub path: Option<String>,
    /// Auth token for a remote replica. Only reported by the connectivity
    /// probe; the local SQLite engine does not use it.
    #[config(env = "DATABASE_AUTH_TOKEN")]
    pub auth_token: Option<String>,
}

#[derive(Config, Debug, Clone)]
pub struct AdminSection {
    #[config(env = "ADMIN_ID")]
    pub id: Option<String>,
    #[config(env = "ADMIN_PASSWORD")]
    pub password: Option<String>,
}

/// Fully-resolved storage credentials, handed to the upload authorizer.
/// Only exists when both halves of the key pair are present.
#[derive(Debug, Clone, Serialize)]
pub struct StorageCredentials {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub public_base: String,
}

impl Settings {
    /// Load settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Settings::builder().env().load()?)
    }

    /// Resolve the storage credential pair, or report the configuration
    /// error that the sign endpoint maps to HTTP 500.
    pub fn storage_credentials(&self) -> Result<StorageCredentials, ConfigError> {
        match (&self.storage.access_key_id, &self.storage.secret_access_key) {
            (Some(key), Some(secret)) => Ok(StorageCredentials {
                account_id: self.storage.account_id.clone(),
                access_key_id: key.clone(),
                secret_access_key: secret.clone(),
                bucket: self.storage.bucket.clone(),
                public_base: self.storage.public_base.trim_end_matches('/').to_string(),
            }),
            _ => Err(ConfigError::MissingStorageCredentials),
        }
    }
}
