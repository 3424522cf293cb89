pub mod book_repository;
pub mod loan_ledger;
pub mod member_repository;
pub mod stats_reader;

use crate::ports::error::StoreError;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use loan_ledger::LoanLedger as PostgresLoanLedger;
pub use member_repository::MemberRepository as PostgresMemberRepository;
pub use stats_reader::StatsReader as PostgresStatsReader;

/// sqlxのエラーをストア障害として包む
pub(crate) fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(err))
}

/// 一意制約違反のとき、その制約（インデックス）名を返す
pub(crate) fn violated_unique_constraint(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    db_err.constraint().map(str::to_string)
}

/// 永続化された値がドメインの制約を満たさないときのエラー
pub(crate) fn invalid_data(message: impl Into<String>) -> StoreError {
    StoreError::Backend(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message.into(),
    )))
}
