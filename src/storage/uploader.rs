//! Client-side asset uploader: the two-phase sign → PUT exchange.
//!
//! Per attempt:
//!
//! 1. POST the target filename and content type to the sign endpoint. Any
//!    failure here — transport error or non-success status — is an
//!    **authorization failure**; no bytes have been sent yet.
//! 2. PUT the full encoded payload to the returned URL with the bound
//!    content type. No chunking, no resume. A non-success status is a
//!    **transport failure**.
//!
//! The object key is `<slug>-<epoch-millis>.<ext>` so repeated attempts for
//! the same article never collide. On success the public read URL from the
//! sign step is returned verbatim — no read-back verification.

use super::{SignUploadRequest, SignUploadResponse};
use crate::transcode::EncodedImage;
use thiserror::Error;

/// Upload failure, carrying which phase broke. The coordinator uses the
/// phase only for its message; both kinds offer the same fallback.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("sign request failed: {0}")]
    Authorization(String),
    #[error("storage upload failed: {0}")]
    Transport(String),
}

/// Performs uploads against a sign endpoint. Holds a reusable HTTP client.
pub struct AssetUploader {
    client: reqwest::Client,
    sign_endpoint: String,
}

impl AssetUploader {
    /// `sign_endpoint` is the absolute URL of `POST /api/sign-upload`.
    pub fn new(sign_endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            sign_endpoint: sign_endpoint.into(),
        }
    }

    /// Upload an encoded image under a key derived from `slug`.
    /// Returns the public read URL.
    pub async fn upload(&self, slug: &str, image: &EncodedImage) -> Result<String, UploadError> {
        let filename = object_key(slug);

        // Phase 1: obtain a write credential.
        let sign_response = self
            .client
            .post(&self.sign_endpoint)
            .json(&SignUploadRequest {
                filename,
                content_type: image.content_type.to_string(),
            })
            .send()
            .await
            .map_err(|e| UploadError::Authorization(e.to_string()))?;

        if !sign_response.status().is_success() {
            return Err(UploadError::Authorization(format!(
                "sign endpoint returned {}",
                sign_response.status()
            )));
        }

        let credential: SignUploadResponse = sign_response
            .json()
            .await
            .map_err(|e| UploadError::Authorization(format!("malformed sign response: {e}")))?;

        // Phase 2: binary transfer, one request.
        let put_response = self
            .client
            .put(&credential.upload_url)
            .header(reqwest::header::CONTENT_TYPE, image.content_type)
            .body(image.bytes.clone())
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !put_response.status().is_success() {
            return Err(UploadError::Transport(format!(
                "storage returned {}",
                put_response.status()
            )));
        }

        Ok(credential.public_url)
    }
}

/// Collision-resistant object key for one upload attempt.
pub fn object_key(slug: &str) -> String {
    format!(
        "{slug}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        crate::transcode::TARGET_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_carries_slug_and_extension() {
        let key = object_key("gold-rates");
        assert!(key.starts_with("gold-rates-"), "got {key:?}");
        assert!(key.ends_with(".avif"), "got {key:?}");
    }

    #[test]
    fn object_key_middle_is_a_timestamp() {
        let key = object_key("s");
        let millis = key
            .strip_prefix("s-")
            .and_then(|rest| rest.strip_suffix(".avif"))
            .unwrap();
        assert!(millis.chars().all(|c| c.is_ascii_digit()), "got {millis:?}");
        assert!(millis.len() >= 13); // epoch millis since 2001
    }

    #[test]
    fn object_keys_differ_between_attempts() {
        let a = object_key("slug");
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = object_key("slug");
        assert_ne!(a, b);
    }

    #[test]
    fn telugu_slug_is_preserved_in_key() {
        let key = object_key("బంగారం-ధర");
        assert!(key.starts_with("బంగారం-ధర-"));
    }
}
