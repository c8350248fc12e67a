//! In-memory article store.
//!
//! Same visible semantics as the SQLite engine — slug uniqueness, ordering,
//! store-assigned price timestamps — without touching disk. Used by tests
//! and by demo runs with no database configured but persistence desired.

use super::{ArticleStore, StoreError};
use crate::article::{Article, PriceSnapshot, StoreStatus};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    articles: Mutex<Vec<Article>>,
    prices: Mutex<Vec<PriceSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn fetch_articles(&self) -> Result<Vec<Article>, StoreError> {
        let mut articles = self.articles.lock().unwrap().clone();
        articles.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(articles)
    }

    async fn save_article(&self, article: &Article) -> Result<(), StoreError> {
        let mut articles = self.articles.lock().unwrap();
        if articles.iter().any(|a| a.slug == article.slug) {
            // Same message shape the SQLite engine produces.
            return Err(StoreError::Database(
                "UNIQUE constraint failed: articles.slug".into(),
            ));
        }
        articles.push(article.clone());
        Ok(())
    }

    async fn append_prices(
        &self,
        gold_24k: i64,
        gold_22k: i64,
        silver: i64,
    ) -> Result<(), StoreError> {
        self.prices.lock().unwrap().push(PriceSnapshot {
            gold_24k,
            gold_22k,
            silver,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    async fn latest_prices(&self) -> Result<Option<PriceSnapshot>, StoreError> {
        Ok(self.prices.lock().unwrap().last().cloned())
    }

    async fn price_history(&self, limit: usize) -> Result<Vec<PriceSnapshot>, StoreError> {
        let prices = self.prices.lock().unwrap();
        let start = prices.len().saturating_sub(limit);
        Ok(prices[start..].to_vec())
    }

    fn status(&self) -> StoreStatus {
        StoreStatus {
            is_connected: true,
            url_detected: true,
            token_detected: false,
            provider: "memory",
        }
    }
}
