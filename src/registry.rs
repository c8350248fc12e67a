//! Commodity price registry: validation and rounding in front of the store.
//!
//! The registry is append-only. Every update is checked before any write —
//! all three values must be finite and strictly positive — then rounded to
//! the nearest integer currency unit. Reads come in two shapes: the single
//! most recent snapshot, and a bounded oldest-first history window for
//! trend charts.

use crate::article::PriceSnapshot;
use crate::store::{ArticleStore, StoreError};
use thiserror::Error;

/// Default history window for trend display.
pub const DEFAULT_HISTORY_WINDOW: usize = 7;

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("enter valid positive values for all price fields")]
    InvalidValues,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A requested price update, as entered. Not yet validated or rounded.
#[derive(Debug, Clone, Copy)]
pub struct PriceUpdate {
    pub gold_24k: f64,
    pub gold_22k: f64,
    pub silver: f64,
}

impl PriceUpdate {
    fn is_valid(&self) -> bool {
        [self.gold_24k, self.gold_22k, self.silver]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Validate, round, and append one snapshot. Rejects before any write; a
/// rejected update leaves the registry untouched.
pub async fn append(store: &dyn ArticleStore, update: PriceUpdate) -> Result<(), PriceError> {
    if !update.is_valid() {
        return Err(PriceError::InvalidValues);
    }
    store
        .append_prices(
            update.gold_24k.round() as i64,
            update.gold_22k.round() as i64,
            update.silver.round() as i64,
        )
        .await?;
    Ok(())
}

/// The most recent snapshot, or `None` when the registry is empty.
pub async fn latest(store: &dyn ArticleStore) -> Result<Option<PriceSnapshot>, PriceError> {
    Ok(store.latest_prices().await?)
}

/// Up to `limit` most recent snapshots, oldest first.
pub async fn history(
    store: &dyn ArticleStore,
    limit: usize,
) -> Result<Vec<PriceSnapshot>, PriceError> {
    Ok(store.price_history(limit).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn valid_update_is_rounded_and_stored() {
        let store = MemoryStore::new();
        append(
            &store,
            PriceUpdate {
                gold_24k: 72450.6,
                gold_22k: 66410.4,
                silver: 925.5,
            },
        )
        .await
        .unwrap();

        let snapshot = latest(&store).await.unwrap().unwrap();
        assert_eq!(snapshot.gold_24k, 72451);
        assert_eq!(snapshot.gold_22k, 66410);
        assert_eq!(snapshot.silver, 926);
    }

    #[tokio::test]
    async fn zero_value_is_rejected_without_write() {
        let store = MemoryStore::new();
        let result = append(
            &store,
            PriceUpdate {
                gold_24k: 0.0,
                gold_22k: 66410.0,
                silver: 925.0,
            },
        )
        .await;
        assert!(matches!(result, Err(PriceError::InvalidValues)));
        assert!(latest(&store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn negative_value_is_rejected() {
        let store = MemoryStore::new();
        let result = append(
            &store,
            PriceUpdate {
                gold_24k: 72000.0,
                gold_22k: -1.0,
                silver: 925.0,
            },
        )
        .await;
        assert!(matches!(result, Err(PriceError::InvalidValues)));
    }

    #[tokio::test]
    async fn nan_and_infinity_are_rejected() {
        let store = MemoryStore::new();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = append(
                &store,
                PriceUpdate {
                    gold_24k: 72000.0,
                    gold_22k: 66000.0,
                    silver: bad,
                },
            )
            .await;
            assert!(matches!(result, Err(PriceError::InvalidValues)), "{bad}");
        }
        assert!(history(&store, DEFAULT_HISTORY_WINDOW).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_of_five_limited_to_three_most_recent_oldest_first() {
        let store = MemoryStore::new();
        for i in 1..=5 {
            append(
                &store,
                PriceUpdate {
                    gold_24k: (i * 1000) as f64,
                    gold_22k: (i * 900) as f64,
                    silver: (i * 10) as f64,
                },
            )
            .await
            .unwrap();
        }

        let window = history(&store, 3).await.unwrap();
        let gold: Vec<_> = window.iter().map(|s| s.gold_24k).collect();
        assert_eq!(gold, [3000, 4000, 5000]);
    }

    #[tokio::test]
    async fn history_on_empty_registry_is_empty_not_error() {
        let store = MemoryStore::new();
        assert!(history(&store, 3).await.unwrap().is_empty());
    }
}
