use chrono::{DateTime, Utc};
use thiserror::Error;

/// 入力値の検証エラー
///
/// 何も永続化される前に検出され、呼び出し元にそのまま返される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必須項目が欠落、または空白のみ
    #[error("field '{0}' is required")]
    MissingField(&'static str),

    /// メールアドレスの形式が不正
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// 返却期限が貸出日より前
    #[error("due date {due_date} is earlier than loan date {loan_date}")]
    DueBeforeLoanDate {
        loan_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    },

    /// 日付が表現可能な範囲外
    #[error("date out of range for field '{0}'")]
    InvalidDate(&'static str),
}

impl ValidationError {
    /// エラーの原因となった項目名
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidEmail(_) => "email",
            ValidationError::DueBeforeLoanDate { .. } => "due_date",
            ValidationError::InvalidDate(field) => field,
        }
    }
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
}
