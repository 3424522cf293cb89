use crate::domain::value_objects::{BookId, LoanId, MemberId};
use thiserror::Error;

/// ストアポート共通のエラー
///
/// ビジネスルール違反はすべて変更前に検出される。
/// `Backend` はストア自体の障害で、操作は適用されていないものとして扱う。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    BookNotFound(BookId),

    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    #[error("loan {0} not found")]
    LoanNotFound(LoanId),

    /// 書籍に未返却の貸出がある
    #[error("book {0} is not available")]
    BookNotAvailable(BookId),

    #[error("loan {0} has already been returned")]
    LoanAlreadyReturned(LoanId),

    /// メールアドレスが他の会員に登録済み
    #[error("email {0} is already registered")]
    EmailTaken(String),

    #[error("book {0} has open loans")]
    BookHasOpenLoans(BookId),

    #[error("member {0} has open loans")]
    MemberHasOpenLoans(MemberId),

    #[error("storage backend failure")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, StoreError>;
