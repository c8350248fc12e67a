//! The publication coordinator.
//!
//! One publish attempt walks a fixed sequence of phases:
//!
//! ```text
//! Idle → Transcoding → Uploading → Persisting → Done
//!              │            │
//!              └────────────┴──→ RecoverableError
//! ```
//!
//! `RecoverableError` is reachable only from the two storage-dependent
//! phases. It carries a single documented recovery: re-invoke the
//! coordinator with [`PublishRequest::skip_asset_upload`] set, which
//! restarts from `Idle` and goes straight to `Persisting` using whatever
//! hosted image URL (if any) was already resident — the article is still
//! published, minus the freshly hosted image. No second transcoding happens
//! on that path.
//!
//! A failure in `Persisting` is final for the attempt: it is reported
//! verbatim from the store, and the skip fallback is not offered (storage
//! has already been bypassed or completed by then).
//!
//! The publish timestamp is assigned here, at persist time — not when the
//! editor hit submit.

use crate::article::Article;
use crate::auth::Principal;
use crate::slug::derive_slug;
use crate::storage::AssetUploader;
use crate::store::{ArticleStore, StoreError};
use crate::transcode;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Pipeline phase, used in logs and recoverable-error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    Idle,
    Transcoding,
    Uploading,
    Persisting,
    Done,
}

impl std::fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PublishPhase::Idle => "idle",
            PublishPhase::Transcoding => "transcoding",
            PublishPhase::Uploading => "uploading",
            PublishPhase::Persisting => "persisting",
            PublishPhase::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    /// Missing headline or body. Handled locally; never reaches the network.
    #[error("headline and content are mandatory")]
    Validation,
    /// Storage trouble during transcode or upload. The article can still be
    /// published by retrying with `skip_asset_upload`.
    #[error("storage unavailable while {phase}: {message} (retry with skip_asset_upload to publish without the image)")]
    Recoverable {
        phase: PublishPhase,
        message: String,
    },
    /// The store rejected the write, or is unreachable. No fallback.
    #[error("publish failed: {0}")]
    Persistence(#[from] StoreError),
}

/// One publish attempt, fully determined by its inputs — the skip fallback
/// is an explicit flag, not hidden UI state.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub category: crate::article::Category,
    pub focus_keywords: Option<String>,
    /// Raw bytes of the attached lead image, if any.
    pub image: Option<Vec<u8>>,
    /// A previously hosted image URL to reuse when the storage step is
    /// skipped or no new image is attached.
    pub existing_image_url: Option<String>,
    /// Degraded-mode retry: bypass transcode + upload and persist directly.
    pub skip_asset_upload: bool,
}

/// Run one publish attempt to completion.
///
/// On success the persisted [`Article`] is returned. See the module docs
/// for the phase machine and failure semantics.
pub async fn publish(
    store: &dyn ArticleStore,
    uploader: &AssetUploader,
    principal: &Principal,
    request: PublishRequest,
) -> Result<Article, PublishError> {
    if request.title.is_empty() || request.body.is_empty() {
        return Err(PublishError::Validation);
    }

    let slug = derive_slug(&request.title);
    debug!(%slug, "publish attempt started");

    let mut image_url = request.existing_image_url.clone();
    let mut freshly_uploaded = false;

    if let Some(image_bytes) = request.image.as_deref().filter(|_| !request.skip_asset_upload) {
        info!(phase = %PublishPhase::Transcoding, %slug, "transcoding lead image");
        let encoded = transcode::transcode(image_bytes).map_err(|e| PublishError::Recoverable {
            phase: PublishPhase::Transcoding,
            message: e.to_string(),
        })?;

        info!(phase = %PublishPhase::Uploading, %slug, bytes = encoded.bytes.len(), "uploading lead image");
        let public_url =
            uploader
                .upload(&slug, &encoded)
                .await
                .map_err(|e| PublishError::Recoverable {
                    phase: PublishPhase::Uploading,
                    message: e.to_string(),
                })?;
        image_url = Some(public_url);
        freshly_uploaded = true;
    }

    info!(phase = %PublishPhase::Persisting, %slug, "persisting article");
    let article = Article {
        image_alt: request.title.clone(),
        title: request.title,
        slug,
        summary: request.summary,
        body: request.body,
        category: request.category,
        featured_image: image_url,
        author_handle: principal.author.handle.to_string(),
        date: chrono::Utc::now().to_rfc3339(),
        focus_keywords: request.focus_keywords,
    };

    if let Err(e) = store.save_article(&article).await {
        if freshly_uploaded {
            // Known cost: no compensating delete links the two stores.
            warn!(
                orphaned_object = article.featured_image.as_deref().unwrap_or(""),
                "persistence failed after upload; object left in storage"
            );
        }
        return Err(e.into());
    }

    info!(phase = %PublishPhase::Done, slug = %article.slug, "published");
    Ok(article)
}
