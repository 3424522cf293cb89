pub mod catalog;
pub mod loan;
pub mod stats;

use crate::ports::{BookRepository, LoanLedger, MemberRepository, StatsReader};
use std::sync::Arc;

/// サービスの依存関係
///
/// 振る舞いは持たず、各ユースケース関数に引数として渡す。
/// メモリ実装・PostgreSQL実装のどちらでも同じ形で組み立てられる。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub books: Arc<dyn BookRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub loans: Arc<dyn LoanLedger>,
    pub stats: Arc<dyn StatsReader>,
}

impl ServiceDependencies {
    /// 1つのストアがすべてのポートを実装している場合の組み立て
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: BookRepository + MemberRepository + LoanLedger + StatsReader + 'static,
    {
        Self {
            books: store.clone(),
            members: store.clone(),
            loans: store.clone(),
            stats: store,
        }
    }
}
