use crate::domain::{
    loan::Loan,
    value_objects::{BookId, LoanId, MemberId},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

pub use super::error::Result;

/// 貸出一覧のステータス条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoanStatusFilter {
    /// すべて
    #[default]
    All,
    /// 未返却（延滞中を含む）
    Active,
    /// 返却済み
    Returned,
    /// 未返却かつ返却期限切れ
    Overdue,
}

impl LoanStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatusFilter::All => "all",
            LoanStatusFilter::Active => "active",
            LoanStatusFilter::Returned => "returned",
            LoanStatusFilter::Overdue => "overdue",
        }
    }
}

impl std::str::FromStr for LoanStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(LoanStatusFilter::All),
            "active" => Ok(LoanStatusFilter::Active),
            "returned" => Ok(LoanStatusFilter::Returned),
            "overdue" => Ok(LoanStatusFilter::Overdue),
            _ => Err(format!("Invalid loan status filter: {}", s)),
        }
    }
}

/// 貸出一覧の検索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanQuery {
    pub status: LoanStatusFilter,
    /// 書籍タイトルまたは会員名（「名 姓」）の部分一致、大文字小文字を区別しない
    pub search: Option<String>,
    pub book_id: Option<BookId>,
    pub member_id: Option<MemberId>,
    /// 延滞判定の基準時刻
    pub as_of: DateTime<Utc>,
}

impl LoanQuery {
    /// 条件なし（全件）
    pub fn all(as_of: DateTime<Utc>) -> Self {
        Self {
            status: LoanStatusFilter::All,
            search: None,
            book_id: None,
            member_id: None,
            as_of,
        }
    }

    /// 検索語を正規化して返す（空白のみは条件なし）
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// 結合を必要としない条件（ID、ステータス）に一致するか
    pub fn matches_loan(&self, loan: &Loan) -> bool {
        if self.book_id.is_some_and(|id| id != loan.book_id) {
            return false;
        }
        if self.member_id.is_some_and(|id| id != loan.member_id) {
            return false;
        }

        match self.status {
            LoanStatusFilter::All => true,
            LoanStatusFilter::Active => loan.is_open(),
            LoanStatusFilter::Returned => loan.is_returned(),
            LoanStatusFilter::Overdue => loan.is_overdue(self.as_of),
        }
    }
}

/// 貸出台帳ポート
///
/// 貸出記録と書籍の貸出可否を1つの原子的な単位として扱う。
/// 同じ書籍に対する `open`/`close` は直列化され、
/// 異なる書籍に対する操作は互いに待たない。
#[async_trait]
pub trait LoanLedger: Send + Sync {
    /// 貸出を記録し、書籍を貸出不可にする
    ///
    /// 貸出可否の確認と書籍の更新は不可分に行われる。
    ///
    /// # エラー
    /// - `BookNotFound` / `MemberNotFound`: 参照先が存在しない
    /// - `BookNotAvailable`: 書籍に未返却の貸出がある
    async fn open(&self, loan: Loan) -> Result<Loan>;

    /// 貸出を返却済みにし、書籍を貸出可能に戻す
    ///
    /// 同じ貸出への同時返却は1件だけが成功する。
    ///
    /// # エラー
    /// - `LoanNotFound`: 貸出が存在しない
    /// - `LoanAlreadyReturned`: 既に返却済み
    async fn close(&self, loan_id: LoanId, returned_at: DateTime<Utc>) -> Result<Loan>;

    /// IDで貸出を取得する
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 条件に一致する貸出を登録順にストリーム配信する
    ///
    /// 呼び出すたびに新しいストリームを返すため、何度でもやり直せる。
    fn stream(&self, query: LoanQuery) -> BoxStream<'_, Result<Loan>>;
}
