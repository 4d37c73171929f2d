//! SQLite-backed [`ResultStore`].

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::lottery::Draw;
use crate::store::{DrawResult, ResultStore, StoreError};

/// Raw column values of one `draws` row.
type DrawRow = (i64, String, String, String, f64, i64);

const SELECT_COLUMNS: &str = "SELECT id, lottery_type, draw, guesses, score, timestamp FROM draws";

/// Result store on a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::with_connection(conn).await
    }

    /// Fresh private in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?).await
    }

    async fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;

        // AUTOINCREMENT so ids are never reused
        conn.execute(
            "CREATE TABLE IF NOT EXISTS draws (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lottery_type TEXT NOT NULL,
                draw TEXT NOT NULL,
                guesses TEXT NOT NULL,
                score REAL NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_draws_type_id ON draws (lottery_type, id)",
            [],
        )?;

        Ok(())
    }
}

fn into_result(row: DrawRow) -> Result<DrawResult, StoreError> {
    let (id, lottery_type, draw, guesses, score, millis) = row;

    let timestamp = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        StoreError::Corrupt {
            id,
            reason: format!("timestamp {} out of range", millis),
        }
    })?;

    Ok(DrawResult {
        id,
        lottery_type,
        draw: serde_json::from_str(&draw)?,
        guesses: serde_json::from_str(&guesses)?,
        score,
        timestamp,
    })
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn append(
        &self,
        lottery_type: &str,
        draw: &Draw,
        guesses: &[Draw],
        score: f64,
    ) -> Result<DrawResult, StoreError> {
        let draw_json = serde_json::to_string(draw)?;
        let guesses_json = serde_json::to_string(guesses)?;
        // Millisecond precision is what survives the round trip
        let millis = Utc::now().timestamp_millis();

        let conn = self.conn.lock().await;
        let row = conn.query_row(
            "INSERT INTO draws (lottery_type, draw, guesses, score, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, lottery_type, draw, guesses, score, timestamp",
            params![lottery_type, draw_json, guesses_json, score, millis],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )?;
        drop(conn);

        let result = into_result(row)?;
        debug!("Stored {} result #{}", result.lottery_type, result.id);
        Ok(result)
    }

    async fn count_by_variant(&self, lottery_type: &str) -> Result<u64, StoreError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM draws WHERE lottery_type = ?1",
            params![lottery_type],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    async fn page(
        &self,
        lottery_type: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<Vec<DrawResult>, StoreError> {
        let offset = page_size as i64 * page_number as i64;

        let rows: Vec<DrawRow> = {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "{} WHERE lottery_type = ?1 ORDER BY id DESC LIMIT ?2 OFFSET ?3",
                SELECT_COLUMNS
            ))?;

            let iter = stmt.query_map(params![lottery_type, page_size, offset], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?;
            iter.collect::<Result<Vec<DrawRow>, _>>()?
        };

        rows.into_iter().map(into_result).collect()
    }

    async fn count_jackpots(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM draws WHERE score = 1.0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn ej(n: u32) -> Draw {
        Draw::Eurojackpot {
            numbers: vec![n, n + 1, n + 2, n + 3, n + 4],
            stars: vec![1, 2],
        }
    }

    fn pb(n: u32) -> Draw {
        Draw::Powerball {
            numbers: vec![n, n + 10, n + 20, n + 30, n + 40],
            powerball: 5,
        }
    }

    async fn seeded(euro: u32, power: u32) -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        for i in 0..euro {
            store.append("eurojackpot", &ej(i + 1), &[ej(i + 2)], 0.5).await.unwrap();
        }
        for i in 0..power {
            store.append("powerball", &pb(i + 1), &[pb(i + 1)], 1.0).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_append_materializes_result() {
        let store = SqliteStore::in_memory().await.unwrap();
        let before = Utc::now().timestamp_millis();

        let result = store.append("eurojackpot", &ej(1), &[ej(7)], 3.0 / 7.0).await.unwrap();

        assert_eq!(result.id, 1);
        assert_eq!(result.lottery_type, "eurojackpot");
        assert_eq!(result.draw, ej(1));
        assert_eq!(result.guesses, vec![ej(7)]);
        assert_eq!(result.score, 3.0 / 7.0);
        assert!(result.timestamp.timestamp_millis() >= before);
    }

    #[tokio::test]
    async fn test_counts() {
        let store = seeded(5, 3).await;

        assert_eq!(store.count_by_variant("eurojackpot").await.unwrap(), 5);
        assert_eq!(store.count_by_variant("powerball").await.unwrap(), 3);
        assert_eq!(store.count_by_variant("lotto").await.unwrap(), 0);
        assert_eq!(store.count_jackpots().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_page_most_recent_first() {
        let store = seeded(5, 2).await;
        let page = store.page("eurojackpot", 3, 0).await.unwrap();

        let ids: Vec<i64> = page.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
        assert!(page.iter().all(|r| r.lottery_type == "eurojackpot"));
    }

    #[tokio::test]
    async fn test_pages_partition_history() {
        let store = seeded(10, 4).await;

        let mut all = Vec::new();
        let mut page_number = 0;
        loop {
            let page = store.page("eurojackpot", 4, page_number).await.unwrap();
            if page.is_empty() {
                break;
            }
            all.extend(page.into_iter().map(|r| r.id));
            page_number += 1;
        }

        assert_eq!(page_number, 3);
        assert_eq!(all, (1..=10).rev().collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_page_is_repeatable() {
        let store = seeded(6, 0).await;

        let first = store.page("eurojackpot", 4, 1).await.unwrap();
        let second = store.page("eurojackpot", 4, 1).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_variant_pages() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.page("powerball", 24, 0).await.unwrap().is_empty());
        assert_eq!(store.count_jackpots().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_appends_unique_ids() {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let key = if i % 2 == 0 { "eurojackpot" } else { "powerball" };
                    let draw = if i % 2 == 0 { ej(1) } else { pb(1) };
                    store.append(key, &draw, &[draw.clone()], 0.0).await.unwrap().id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        let unique: BTreeSet<i64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 16);
        assert_eq!(unique.into_iter().collect::<Vec<_>>(), (1..=16).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_open_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("lottery-feed-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("draws.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.append("powerball", &pb(3), &[pb(4)], 0.0).await.unwrap();
        }
        let reopened = SqliteStore::open(&path).await.unwrap();
        assert_eq!(reopened.count_by_variant("powerball").await.unwrap(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
