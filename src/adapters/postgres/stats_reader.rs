use crate::ports::stats_reader::{LibraryStats, Result, StatsReader as StatsReaderTrait};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::backend;

/// StatsReaderのPostgreSQL実装
pub struct StatsReader {
    pool: PgPool,
}

impl StatsReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsReaderTrait for StatsReader {
    /// 4つの件数を1文で集計する（同一スナップショットから読まれる）
    async fn snapshot(&self) -> Result<LibraryStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books) AS total_books,
                (SELECT COUNT(*) FROM books WHERE is_available) AS available_books,
                (SELECT COUNT(*) FROM members) AS total_members,
                (SELECT COUNT(*) FROM loans WHERE return_date IS NULL) AS active_loans
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        let count = |column: &str| -> u64 {
            let value: i64 = row.get(column);
            value.max(0) as u64
        };

        Ok(LibraryStats {
            total_books: count("total_books"),
            available_books: count("available_books"),
            total_members: count("total_members"),
            active_loans: count("active_loans"),
        })
    }
}
