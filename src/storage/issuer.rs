//! Upload-authorization issuer.
//!
//! Mints a short-lived write credential bound to exactly one object key and
//! one content type. The credential is an HMAC-SHA256 capability embedded in
//! the upload URL's query string: anyone holding the URL may PUT that one
//! object with that one content type until the embedded expiry, and nothing
//! else. Credentials are generated fresh per attempt and never persisted.
//!
//! Stateless and idempotent per call — safe to invoke concurrently for
//! distinct keys.

use crate::config::StorageCredentials;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use url::Url;

/// Credential lifetime. Short by design: the uploader consumes it
/// immediately, and expiry is the only single-use enforcement.
pub const CREDENTIAL_TTL_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum SignError {
    #[error("{0} is required")]
    EmptyField(&'static str),
    #[error("failed to generate upload URL: {0}")]
    Signing(String),
}

/// A minted write credential. Valid for one object key and one content
/// type; expires server-side regardless of client usage.
#[derive(Debug, Clone)]
pub struct UploadCredential {
    pub upload_url: String,
    pub public_url: String,
    /// Unix seconds after which the storage side rejects the PUT.
    pub expires_at: i64,
}

/// Server-side capability minter. Holds the resolved storage credentials;
/// construction is only possible once configuration has been validated.
pub struct UploadAuthorizer {
    creds: StorageCredentials,
}

impl UploadAuthorizer {
    pub fn new(creds: StorageCredentials) -> Self {
        Self { creds }
    }

    /// Mint a credential for one object key and content type.
    pub fn authorize(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadCredential, SignError> {
        if filename.is_empty() {
            return Err(SignError::EmptyField("filename"));
        }
        if content_type.is_empty() {
            return Err(SignError::EmptyField("content type"));
        }

        let expires_at = Utc::now().timestamp() + CREDENTIAL_TTL_SECS;
        let signature = self.signature(filename, content_type, expires_at)?;

        let endpoint = format!("https://{}.r2.cloudflarestorage.com", self.creds.account_id);
        let mut upload_url =
            Url::parse(&endpoint).map_err(|e| SignError::Signing(e.to_string()))?;
        upload_url
            .path_segments_mut()
            .map_err(|()| SignError::Signing("storage endpoint is not a base URL".into()))?
            .push(&self.creds.bucket)
            .push(filename);
        upload_url
            .query_pairs_mut()
            .append_pair("X-Access-Key", &self.creds.access_key_id)
            .append_pair("X-Expires", &expires_at.to_string())
            .append_pair("X-Content-Type", content_type)
            .append_pair("X-Signature", &signature);

        let mut public_url = Url::parse(&self.creds.public_base)
            .map_err(|e| SignError::Signing(format!("bad public base URL: {e}")))?;
        public_url
            .path_segments_mut()
            .map_err(|()| SignError::Signing("public base is not a base URL".into()))?
            .push(filename);

        Ok(UploadCredential {
            upload_url: upload_url.into(),
            public_url: public_url.into(),
            expires_at,
        })
    }

    /// HMAC-SHA256 over everything the credential binds: verb, bucket, key,
    /// content type, expiry.
    fn signature(
        &self,
        filename: &str,
        content_type: &str,
        expires_at: i64,
    ) -> Result<String, SignError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.creds.secret_access_key.as_bytes())
            .map_err(|e| SignError::Signing(e.to_string()))?;
        mac.update(
            format!(
                "PUT\n{}/{}\n{}\n{}",
                self.creds.bucket, filename, content_type, expires_at
            )
            .as_bytes(),
        );
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorizer() -> UploadAuthorizer {
        UploadAuthorizer::new(StorageCredentials {
            account_id: "acct123".into(),
            access_key_id: "AKID".into(),
            secret_access_key: "topsecret".into(),
            bucket: "press-assets".into(),
            public_base: "https://pub.example.com".into(),
        })
    }

    #[test]
    fn upload_url_targets_account_bucket_and_key() {
        let cred = authorizer().authorize("story-1.avif", "image/avif").unwrap();
        assert!(
            cred.upload_url
                .starts_with("https://acct123.r2.cloudflarestorage.com/press-assets/story-1.avif?")
        );
    }

    #[test]
    fn public_url_joins_base_and_key() {
        let cred = authorizer().authorize("story-1.avif", "image/avif").unwrap();
        assert_eq!(cred.public_url, "https://pub.example.com/story-1.avif");
    }

    #[test]
    fn credential_expires_in_about_a_minute() {
        let cred = authorizer().authorize("a.avif", "image/avif").unwrap();
        let remaining = cred.expires_at - Utc::now().timestamp();
        assert!((55..=60).contains(&remaining), "remaining {remaining}s");
    }

    #[test]
    fn signature_binds_content_type() {
        let auth = authorizer();
        let avif = auth.signature("k.avif", "image/avif", 1_000_000).unwrap();
        let jpeg = auth.signature("k.avif", "image/jpeg", 1_000_000).unwrap();
        assert_ne!(avif, jpeg);
    }

    #[test]
    fn signature_binds_object_key() {
        let auth = authorizer();
        let a = auth.signature("a.avif", "image/avif", 1_000_000).unwrap();
        let b = auth.signature("b.avif", "image/avif", 1_000_000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn signature_is_deterministic_for_fixed_inputs() {
        let auth = authorizer();
        let one = auth.signature("k", "ct", 42).unwrap();
        let two = auth.signature("k", "ct", 42).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn non_ascii_key_is_percent_encoded() {
        let cred = authorizer()
            .authorize("బంగారం-1700000000000.avif", "image/avif")
            .unwrap();
        assert!(cred.upload_url.contains("%E0%B0%AC"), "got {}", cred.upload_url);
        assert!(!cred.public_url.contains('బ'));
    }

    #[test]
    fn empty_filename_is_rejected() {
        assert!(matches!(
            authorizer().authorize("", "image/avif"),
            Err(SignError::EmptyField("filename"))
        ));
    }

    #[test]
    fn empty_content_type_is_rejected() {
        assert!(matches!(
            authorizer().authorize("a.avif", ""),
            Err(SignError::EmptyField("content type"))
        ));
    }
}
