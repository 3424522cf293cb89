use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, MemberId, ReturnLoanError, ValidationError};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出ステータス
///
/// 保存はせず、`return_date` と `due_date` から読み取り時に導出する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Loan集約 - 1冊の書籍の1回の貸出
///
/// 返却済みかどうかは `return_date` の有無で表す。
/// 返却は一度だけ行われ、以後は読み取り専用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    // 貸出管理の責務
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn is_open(&self) -> bool {
        !self.is_returned()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        is_overdue(self, now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.is_returned() {
            LoanStatus::Returned
        } else if is_overdue(self, now) {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }
}

/// 貸出日から既定の返却期限を求める
///
/// 表現可能な日付の範囲を超える場合は None。
pub fn default_due_date(loan_date: DateTime<Utc>) -> Option<DateTime<Utc>> {
    loan_date.checked_add_signed(Duration::days(LOAN_PERIOD_DAYS))
}

/// 純粋関数：貸出を開始する
///
/// ビジネスルール：
/// - 返却期限の指定がなければ貸出日 + 14日間
/// - 返却期限は貸出日より前にできない
/// - 既定の返却期限が日付の範囲を超える貸出日は InvalidDate
///
/// 書籍の貸出可否はここでは判定しない（台帳が原子的に確認する）。
/// 副作用なし。新しいLoanを返す。
pub fn open_loan(
    book_id: BookId,
    member_id: MemberId,
    loan_date: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
) -> Result<Loan, ValidationError> {
    let due_date = match due_date {
        Some(due_date) => due_date,
        None => default_due_date(loan_date).ok_or(ValidationError::InvalidDate("loan_date"))?,
    };

    if due_date < loan_date {
        return Err(ValidationError::DueBeforeLoanDate {
            loan_date,
            due_date,
        });
    }

    Ok(Loan {
        loan_id: LoanId::new(),
        book_id,
        member_id,
        loan_date,
        due_date,
        return_date: None,
        created_at,
        updated_at: created_at,
    })
}

/// 純粋関数：貸出を返却する
///
/// ビジネスルール：
/// - 延滞していても返却は受け付ける
/// - 返却済みの貸出は再度返却できない
///
/// 副作用なし。新しいLoanを返す。
pub fn return_loan(loan: &Loan, returned_at: DateTime<Utc>) -> Result<Loan, ReturnLoanError> {
    if loan.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(Loan {
        return_date: Some(returned_at),
        updated_at: returned_at,
        ..loan.clone()
    })
}

/// 純粋関数：延滞判定
pub fn is_overdue(loan: &Loan, now: DateTime<Utc>) -> bool {
    !loan.is_returned() && now > loan.due_date
}
