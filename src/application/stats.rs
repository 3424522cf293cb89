use crate::application::ServiceDependencies;
use crate::ports::{LibraryStats, StoreError};

/// 蔵書数・貸出可能数・会員数・貸出中件数を集計する
///
/// 4つの値は同じスナップショットから読まれる。
pub async fn get_stats(deps: &ServiceDependencies) -> Result<LibraryStats, StoreError> {
    deps.stats.snapshot().await
}
