//! Read-side queries over the result store.
//!
//! Framework-free so the HTTP layer stays thin glue.

use thiserror::Error;

use crate::lottery::VariantRegistry;
use crate::network::protocol::{HistoryResponse, WinsResponse};
use crate::store::{ResultStore, StoreError};

/// Query errors.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No variant registered under the requested key.
    #[error("Unknown lottery type: {0}")]
    UnknownVariant(String),

    /// Request did not name a variant.
    #[error("Missing lottery type")]
    MissingVariant,

    /// Backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::UnknownVariant(_) | QueryError::MissingVariant)
    }
}

/// One page of history for `lottery_type`.
///
/// A known variant with no results yet yields an empty page and `total: 0`.
pub async fn history(
    store: &dyn ResultStore,
    variants: &VariantRegistry,
    lottery_type: &str,
    page_number: u32,
    page_size: u32,
) -> Result<HistoryResponse, QueryError> {
    if lottery_type.is_empty() {
        return Err(QueryError::MissingVariant);
    }
    if variants.get(lottery_type).is_none() {
        return Err(QueryError::UnknownVariant(lottery_type.to_string()));
    }

    let total = store.count_by_variant(lottery_type).await?;
    let data = store.page(lottery_type, page_size, page_number).await?;

    Ok(HistoryResponse { data, total })
}

/// Jackpots recorded so far.
pub async fn wins(store: &dyn ResultStore) -> Result<WinsResponse, QueryError> {
    let wins = store.count_jackpots().await?;
    Ok(WinsResponse { wins })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lottery::Draw;
    use crate::store::SqliteStore;
    use std::collections::BTreeSet;

    fn pb(n: u32) -> Draw {
        Draw::Powerball {
            numbers: vec![n, 2, 3, 4, 5],
            powerball: 1,
        }
    }

    async fn store_with_powerball(count: u32) -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        for i in 0..count {
            let score = if i % 5 == 0 { 1.0 } else { 0.5 };
            store.append("powerball", &pb(i + 10), &[pb(i + 10)], score).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_unknown_variant_is_client_error() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = history(&store, &VariantRegistry::builtin(), "lotto", 0, 24)
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::UnknownVariant(ref k) if k == "lotto"));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_missing_variant_is_client_error() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = history(&store, &VariantRegistry::builtin(), "", 0, 24)
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::MissingVariant));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_known_variant_without_rows() {
        let store = SqliteStore::in_memory().await.unwrap();
        let page = history(&store, &VariantRegistry::builtin(), "eurojackpot", 0, 24)
            .await
            .unwrap();

        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_pages_do_not_overlap() {
        let store = store_with_powerball(50).await;
        let variants = VariantRegistry::builtin();

        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for page_number in 0..3 {
            let page = history(&store, &variants, "powerball", page_number, 20).await.unwrap();
            assert_eq!(page.total, 50);
            for result in page.data {
                assert!(seen.insert(result.id), "id {} on two pages", result.id);
                ordered.push(result.id);
            }
        }

        assert_eq!(ordered, (1..=50).rev().collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_history_is_idempotent() {
        let store = store_with_powerball(30).await;
        let variants = VariantRegistry::builtin();

        let a = history(&store, &variants, "powerball", 1, 24).await.unwrap();
        let b = history(&store, &variants, "powerball", 1, 24).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.data.len(), 6);
    }

    #[tokio::test]
    async fn test_wins_counts_jackpots() {
        let empty = SqliteStore::in_memory().await.unwrap();
        assert_eq!(wins(&empty).await.unwrap().wins, 0);

        let store = store_with_powerball(12).await;
        assert_eq!(wins(&store).await.unwrap().wins, 3);
    }
}
