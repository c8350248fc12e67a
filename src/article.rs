//! Shared domain types: articles, authors, categories, price snapshots.
//!
//! These types cross every seam in the crate — the coordinator builds them,
//! the store persists them, the CLI prints them — and are serialized with
//! serde at the store and HTTP boundaries.

use serde::{Deserialize, Serialize};

/// A published article. Created once at publish time; this crate has no
/// edit or delete operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    /// Headline. Never empty — validated before the pipeline starts.
    pub title: String,
    /// Unique URL-safe identifier derived from the title (see [`crate::slug`]).
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Free-text body. May contain inline markup tokens inserted upstream;
    /// this crate stores them verbatim.
    pub body: String,
    pub category: Category,
    /// Absolute public URL of the hosted lead image, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// Alt text for the lead image. Defaults to the title at persist time.
    pub image_alt: String,
    /// Handle of the publishing author (one of the fixed roster).
    pub author_handle: String,
    /// RFC 3339 publish timestamp, assigned when the record is persisted.
    pub date: String,
    /// Comma-separated SEO keywords. Stored verbatim, never parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_keywords: Option<String>,
}

/// Fixed category set. Articles carry exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Market Analysis")]
    MarketAnalysis,
    #[serde(rename = "Legal & Policy")]
    LegalPolicy,
    #[serde(rename = "Heritage & Craft")]
    HeritageCraft,
    #[serde(rename = "Investment Advice")]
    InvestmentAdvice,
    #[serde(rename = "Daily Updates")]
    DailyUpdates,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::MarketAnalysis,
        Category::LegalPolicy,
        Category::HeritageCraft,
        Category::InvestmentAdvice,
        Category::DailyUpdates,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::MarketAnalysis => "Market Analysis",
            Category::LegalPolicy => "Legal & Policy",
            Category::HeritageCraft => "Heritage & Craft",
            Category::InvestmentAdvice => "Investment Advice",
            Category::DailyUpdates => "Daily Updates",
        }
    }

    /// Parse a stored label back into a category. Unknown labels fall back
    /// to [`Category::DailyUpdates`] so old rows never fail to load.
    pub fn from_label(label: &str) -> Category {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
            .unwrap_or(Category::DailyUpdates)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::DailyUpdates
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An author on the fixed editorial roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Author {
    pub handle: &'static str,
    pub name: &'static str,
}

/// The editorial roster. The first entry is the default byline used when a
/// stored handle no longer matches anyone.
pub const AUTHORS: &[Author] = &[
    Author {
        handle: "@skulkarni",
        name: "S. Kulkarni",
    },
    Author {
        handle: "@mreddy",
        name: "M. Reddy",
    },
    Author {
        handle: "@desk",
        name: "News Desk",
    },
];

/// Resolve a stored handle to a roster author.
///
/// Matching is case-insensitive and tolerates a missing `@` prefix, since
/// old rows were written both ways. Unknown handles resolve to the roster
/// default rather than failing the read.
pub fn resolve_author(handle: &str) -> &'static Author {
    let wanted = handle.trim_start_matches('@');
    AUTHORS
        .iter()
        .find(|a| a.handle.trim_start_matches('@').eq_ignore_ascii_case(wanted))
        .unwrap_or(&AUTHORS[0])
}

/// One row of the append-only price registry. All values are integer
/// currency units, rounded before storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSnapshot {
    pub gold_24k: i64,
    pub gold_22k: i64,
    pub silver: i64,
    /// Server-assigned insertion timestamp (RFC 3339).
    pub timestamp: String,
}

/// Connectivity probe result for the article store. Gates UI/CLI actions
/// only; the coordinator never branches on it.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub is_connected: bool,
    pub url_detected: bool,
    pub token_detected: bool,
    pub provider: &'static str,
}
