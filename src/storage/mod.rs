//! Object-storage access: credential minting and the two-phase upload.
//!
//! The crate never holds long-lived storage credentials on the publishing
//! side. The [`issuer`] (server-side) mints a short-lived, single-object
//! write credential; the [`uploader`] (client-side) requests one over HTTP
//! and performs the binary transfer. The wire types they share live here.

pub mod issuer;
pub mod uploader;

use serde::{Deserialize, Serialize};

pub use issuer::{SignError, UploadAuthorizer, UploadCredential};
pub use uploader::{AssetUploader, UploadError};

/// Body of `POST /api/sign-upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadRequest {
    pub filename: String,
    pub content_type: String,
}

/// Success body of `POST /api/sign-upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadResponse {
    /// Signed, time-boxed write URL for exactly one object.
    pub upload_url: String,
    /// Deterministic public read URL for the same object.
    pub public_url: String,
}
