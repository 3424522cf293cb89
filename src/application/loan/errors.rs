use crate::domain::ValidationError;
use crate::ports::StoreError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 書籍に未返却の貸出がある
    #[error("Book is not available for loan")]
    BookNotAvailable,

    /// 既に返却済み
    #[error("Loan has already been returned")]
    LoanAlreadyReturned,

    /// 入力値の検証エラー
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// ストアの障害
    #[error("Store error")]
    StoreError(#[source] StoreError),
}

impl From<StoreError> for LoanApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BookNotFound(_) => LoanApplicationError::BookNotFound,
            StoreError::MemberNotFound(_) => LoanApplicationError::MemberNotFound,
            StoreError::LoanNotFound(_) => LoanApplicationError::LoanNotFound,
            StoreError::BookNotAvailable(_) => LoanApplicationError::BookNotAvailable,
            StoreError::LoanAlreadyReturned(_) => LoanApplicationError::LoanAlreadyReturned,
            other => LoanApplicationError::StoreError(other),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
