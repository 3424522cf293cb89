use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, MemberId};

/// コマンド：書籍を貸し出す
///
/// `loan_date` 省略時は `requested_at`、`due_date` 省略時は貸出日 + 14日間。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoan {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub loan_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    pub returned_at: DateTime<Utc>,
}
