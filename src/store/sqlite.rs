//! SQLite-backed article store.
//!
//! Schema matches the production deployment: an `articles` table keyed by a
//! unique slug and an append-only `price_history` table whose timestamp is
//! assigned by the database (`CURRENT_TIMESTAMP`).
//!
//! The connection sits behind a `tokio::sync::Mutex`. Every operation is a
//! single fast statement issued by the one active editor flow, so blocking
//! the executor for the duration of a statement is acceptable here.

use super::{ArticleStore, StoreError, normalize_timestamp};
use crate::article::{Article, Category, PriceSnapshot, StoreStatus};
use async_trait::async_trait;
use rusqlite::{Connection, params};
use std::path::Path;
use tokio::sync::Mutex;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    token_detected: bool,
}

impl SqliteStore {
    /// Open (or create) the database and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>, token_detected: bool) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            token_detected,
        })
    }

    /// In-memory database, for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            token_detected: false,
        })
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            summary TEXT,
            content TEXT,
            category TEXT,
            author_handle TEXT,
            featured_image TEXT,
            image_alt TEXT,
            date TEXT,
            focus_keywords TEXT
        );
        CREATE TABLE IF NOT EXISTS price_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            gold24k INTEGER NOT NULL,
            gold22k INTEGER NOT NULL,
            silver INTEGER NOT NULL,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
        );",
    )
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn fetch_articles(&self) -> Result<Vec<Article>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT title, slug, summary, content, category, author_handle,
                    featured_image, image_alt, date, focus_keywords
             FROM articles ORDER BY date DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Article {
                title: row.get(0)?,
                slug: row.get(1)?,
                summary: row.get(2)?,
                body: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                category: Category::from_label(
                    &row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                ),
                author_handle: crate::article::resolve_author(
                    &row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                )
                .handle
                .to_string(),
                featured_image: row.get(6)?,
                image_alt: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                date: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                focus_keywords: row.get(9)?,
            })
        })?;
        let mut articles = Vec::new();
        for row in rows {
            articles.push(row?);
        }
        Ok(articles)
    }

    async fn save_article(&self, article: &Article) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO articles (title, slug, summary, content, category, author_handle,
                                   featured_image, image_alt, date, focus_keywords)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                article.title,
                article.slug,
                article.summary,
                article.body,
                article.category.label(),
                article.author_handle,
                article.featured_image,
                article.image_alt,
                article.date,
                article.focus_keywords,
            ],
        )?;
        Ok(())
    }

    async fn append_prices(
        &self,
        gold_24k: i64,
        gold_22k: i64,
        silver: i64,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO price_history (gold24k, gold22k, silver) VALUES (?1, ?2, ?3)",
            params![gold_24k, gold_22k, silver],
        )?;
        Ok(())
    }

    async fn latest_prices(&self) -> Result<Option<PriceSnapshot>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT gold24k, gold22k, silver, timestamp
             FROM price_history ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map([], snapshot_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn price_history(&self, limit: usize) -> Result<Vec<PriceSnapshot>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT gold24k, gold22k, silver, timestamp
             FROM price_history ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], snapshot_from_row)?;
        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(row?);
        }
        // Rows came newest-first; history is served oldest-first.
        snapshots.reverse();
        Ok(snapshots)
    }

    fn status(&self) -> StoreStatus {
        StoreStatus {
            is_connected: true,
            url_detected: true,
            token_detected: self.token_detected,
            provider: "SQLite",
        }
    }
}

fn snapshot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PriceSnapshot> {
    Ok(PriceSnapshot {
        gold_24k: row.get(0)?,
        gold_22k: row.get(1)?,
        silver: row.get(2)?,
        timestamp: normalize_timestamp(&row.get::<_, Option<String>>(3)?.unwrap_or_default()),
    })
}
