use crate::domain::ValidationError;
use crate::ports::StoreError;
use thiserror::Error;

/// 蔵書・会員管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogApplicationError {
    #[error("Book not found")]
    BookNotFound,

    #[error("Member not found")]
    MemberNotFound,

    /// メールアドレスが他の会員に登録済み
    #[error("Email already registered: {0}")]
    EmailAlreadyRegistered(String),

    /// 未返却の貸出があるため削除できない
    #[error("Book has open loans")]
    BookHasOpenLoans,

    /// 未返却の貸出があるため削除できない
    #[error("Member has open loans")]
    MemberHasOpenLoans,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error")]
    StoreError(#[source] StoreError),
}

impl From<StoreError> for CatalogApplicationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BookNotFound(_) => CatalogApplicationError::BookNotFound,
            StoreError::MemberNotFound(_) => CatalogApplicationError::MemberNotFound,
            StoreError::EmailTaken(email) => CatalogApplicationError::EmailAlreadyRegistered(email),
            StoreError::BookHasOpenLoans(_) => CatalogApplicationError::BookHasOpenLoans,
            StoreError::MemberHasOpenLoans(_) => CatalogApplicationError::MemberHasOpenLoans,
            other => CatalogApplicationError::StoreError(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogApplicationError>;
