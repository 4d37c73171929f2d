//! Result Store
//!
//! Append-only log of draw results. The scheduler writes through
//! [`ResultStore::append`]; the query API reads pages and counters.

pub mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lottery::Draw;

pub use sqlite::SqliteStore;

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/draws.db"),
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var_os("LOTTO_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| Self::default().database_path),
        }
    }
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Draw (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure while opening the database.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row cannot be turned back into a result.
    #[error("Corrupt record {id}: {reason}")]
    Corrupt {
        /// Row id.
        id: i64,
        /// What was wrong with it.
        reason: String,
    },

    /// Backend cannot serve requests right now.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One persisted draw, guess and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawResult {
    /// Store-assigned id, strictly increasing.
    pub id: i64,
    /// Variant key.
    pub lottery_type: String,
    /// The simulated draw.
    pub draw: Draw,
    /// Simulated guesses (one in practice).
    pub guesses: Vec<Draw>,
    /// Match fraction in [0, 1].
    pub score: f64,
    /// When the result was stored.
    pub timestamp: DateTime<Utc>,
}

impl DrawResult {
    /// Every slot of the guess matched.
    pub fn is_jackpot(&self) -> bool {
        self.score == 1.0
    }

    /// Serialize for the live feed.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Persistence contract the scheduler and query API rely on.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a result and return it with its id and timestamp.
    ///
    /// Concurrent appends are serialized; ids never collide.
    async fn append(
        &self,
        lottery_type: &str,
        draw: &Draw,
        guesses: &[Draw],
        score: f64,
    ) -> Result<DrawResult, StoreError>;

    /// Total results recorded for a variant.
    async fn count_by_variant(&self, lottery_type: &str) -> Result<u64, StoreError>;

    /// Page `page_number` of a variant's history, most recent first.
    async fn page(
        &self,
        lottery_type: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<Vec<DrawResult>, StoreError>;

    /// Results with a perfect score, across all variants.
    async fn count_jackpots(&self) -> Result<u64, StoreError>;
}
