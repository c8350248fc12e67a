//! The article store collaborator.
//!
//! [`ArticleStore`] is the seam between the publication pipeline and the
//! relational store: article reads/writes, the price-history operations, and
//! a connectivity probe that gates CLI actions (it is never consulted by the
//! coordinator's internal logic).
//!
//! Three implementations:
//! - [`SqliteStore`] — the production engine (articles + price_history).
//! - [`MemoryStore`] — offline mode and tests; same visible semantics,
//!   including slug uniqueness.
//! - [`DisconnectedStore`] — what you get when no database is configured:
//!   reads come back empty, writes fail with [`StoreError::Disconnected`].
//!
//! All writes are unguarded single statements; the store's native atomicity
//! per statement is the only transactional guarantee.

pub mod memory;
pub mod sqlite;

use crate::article::{Article, PriceSnapshot, StoreStatus};
use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database connection missing; set DATABASE_PATH in the environment")]
    Disconnected,
    #[error("database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// All articles, newest first.
    async fn fetch_articles(&self) -> Result<Vec<Article>, StoreError>;

    /// Insert one article. Slug uniqueness is enforced here; a duplicate
    /// slug is a store error reported verbatim.
    async fn save_article(&self, article: &Article) -> Result<(), StoreError>;

    /// Append one price row with a store-assigned timestamp. Values arrive
    /// already validated and rounded (see [`crate::registry`]).
    async fn append_prices(
        &self,
        gold_24k: i64,
        gold_22k: i64,
        silver: i64,
    ) -> Result<(), StoreError>;

    /// The most recently inserted price row, or `None` when the registry is
    /// empty — never a zero-filled default.
    async fn latest_prices(&self) -> Result<Option<PriceSnapshot>, StoreError>;

    /// Up to `limit` most recent rows, oldest first. Empty registry yields
    /// an empty vec, never an error.
    async fn price_history(&self, limit: usize) -> Result<Vec<PriceSnapshot>, StoreError>;

    /// Connectivity probe for gating CLI affordances.
    fn status(&self) -> StoreStatus;
}

/// Store stand-in for deployments with no database configured. Mirrors the
/// probe shape so the CLI can explain exactly what is missing.
pub struct DisconnectedStore {
    token_detected: bool,
}

impl DisconnectedStore {
    pub fn new(token_detected: bool) -> Self {
        Self { token_detected }
    }
}

#[async_trait]
impl ArticleStore for DisconnectedStore {
    async fn fetch_articles(&self) -> Result<Vec<Article>, StoreError> {
        Ok(Vec::new())
    }

    async fn save_article(&self, _article: &Article) -> Result<(), StoreError> {
        Err(StoreError::Disconnected)
    }

    async fn append_prices(&self, _g24: i64, _g22: i64, _s: i64) -> Result<(), StoreError> {
        Err(StoreError::Disconnected)
    }

    async fn latest_prices(&self) -> Result<Option<PriceSnapshot>, StoreError> {
        Ok(None)
    }

    async fn price_history(&self, _limit: usize) -> Result<Vec<PriceSnapshot>, StoreError> {
        Ok(Vec::new())
    }

    fn status(&self) -> StoreStatus {
        StoreStatus {
            is_connected: false,
            url_detected: false,
            token_detected: self.token_detected,
            provider: "SQLite",
        }
    }
}

/// Parse a store timestamp into RFC 3339, tolerating both SQLite's
/// `YYYY-MM-DD HH:MM:SS` (CURRENT_TIMESTAMP is UTC) and RFC 3339 itself.
/// Unparseable input is passed through unchanged rather than dropped.
pub(crate) fn normalize_timestamp(raw: &str) -> String {
    use chrono::{DateTime, NaiveDateTime, Utc};

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).to_rfc3339();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc().to_rfc3339();
    }
    raw.to_string()
}
