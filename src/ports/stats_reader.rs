use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use super::error::Result;

/// 蔵書・会員・貸出の集計値
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_books: u64,
    pub available_books: u64,
    pub total_members: u64,
    pub active_loans: u64,
}

/// 集計用の読み取りポート
#[async_trait]
pub trait StatsReader: Send + Sync {
    /// 一貫したスナップショットから集計する
    ///
    /// 書籍の貸出可否と未返却の貸出件数が食い違う途中状態は返さない。
    async fn snapshot(&self) -> Result<LibraryStats>;
}
