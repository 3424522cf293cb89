use crate::domain::{
    loan::Loan,
    value_objects::{BookId, LoanId, MemberId},
};
use crate::ports::error::StoreError;
use crate::ports::loan_ledger::{LoanLedger as LoanLedgerTrait, LoanQuery, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{backend, violated_unique_constraint};

const OPEN_LOAN_PER_BOOK_INDEX: &str = "loans_one_open_per_book";

/// 貸出一覧のストリーム用クエリ
///
/// 検索語は書籍タイトルまたは「名 姓」に対して大文字小文字を区別せず照合する。
/// 並びは登録順（`seq` は挿入時に採番される）。
const STREAM_LOANS_SQL: &str = r#"
    SELECT
        l.id,
        l.book_id,
        l.member_id,
        l.loan_date,
        l.due_date,
        l.return_date,
        l.created_at,
        l.updated_at
    FROM loans l
    JOIN books b ON b.id = l.book_id
    JOIN members m ON m.id = l.member_id
    WHERE ($1::uuid IS NULL OR l.book_id = $1)
      AND ($2::uuid IS NULL OR l.member_id = $2)
      AND (
            $3::text = 'all'
         OR ($3::text = 'active' AND l.return_date IS NULL)
         OR ($3::text = 'returned' AND l.return_date IS NOT NULL)
         OR ($3::text = 'overdue' AND l.return_date IS NULL AND l.due_date < $4)
      )
      AND (
            $5::text IS NULL
         OR b.title ILIKE $5
         OR (m.first_name || ' ' || m.last_name) ILIKE $5
      )
    ORDER BY l.seq ASC
"#;

fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        loan_id: LoanId::from_uuid(row.get("id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        loan_date: row.get("loan_date"),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// LIKEのワイルドカードをエスケープし、部分一致パターンにする
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// LoanLedgerのPostgreSQL実装
///
/// 貸出開始・返却はそれぞれ1トランザクションで書籍の貸出可否も更新する。
/// 書籍行のロックにより同じ書籍への操作は直列化される。
pub struct LoanLedger {
    pool: PgPool,
}

impl LoanLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanLedgerTrait for LoanLedger {
    /// 書籍行を `FOR UPDATE` でロックし、貸出可否を確認してから貸出を記録する
    ///
    /// 会員行は `FOR SHARE` でロックし、同時に行われる会員削除と直列化する。
    /// 部分一意インデックス違反は BookNotAvailable として扱う。
    async fn open(&self, loan: Loan) -> Result<Loan> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let is_available: Option<bool> =
            sqlx::query_scalar("SELECT is_available FROM books WHERE id = $1 FOR UPDATE")
                .bind(loan.book_id.value())
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;
        let Some(is_available) = is_available else {
            return Err(StoreError::BookNotFound(loan.book_id));
        };

        let member = sqlx::query("SELECT id FROM members WHERE id = $1 FOR SHARE")
            .bind(loan.member_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if member.is_none() {
            return Err(StoreError::MemberNotFound(loan.member_id));
        }

        if !is_available {
            return Err(StoreError::BookNotAvailable(loan.book_id));
        }

        sqlx::query(
            r#"
            INSERT INTO loans (
                id,
                book_id,
                member_id,
                loan_date,
                due_date,
                return_date,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.book_id.value())
        .bind(loan.member_id.value())
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match violated_unique_constraint(&e) {
            Some(constraint) if constraint == OPEN_LOAN_PER_BOOK_INDEX => {
                StoreError::BookNotAvailable(loan.book_id)
            }
            _ => backend(e),
        })?;

        sqlx::query("UPDATE books SET is_available = FALSE WHERE id = $1")
            .bind(loan.book_id.value())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(loan)
    }

    /// 未返却の貸出だけを返却済みにする
    ///
    /// 同時に2回返却された場合、後続のUPDATEは0行となり AlreadyReturned になる。
    async fn close(&self, loan_id: LoanId, returned_at: DateTime<Utc>) -> Result<Loan> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = $2, updated_at = $2
            WHERE id = $1 AND return_date IS NULL
            RETURNING
                id,
                book_id,
                member_id,
                loan_date,
                due_date,
                return_date,
                created_at,
                updated_at
            "#,
        )
        .bind(loan_id.value())
        .bind(returned_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;

        let Some(row) = row else {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM loans WHERE id = $1)")
                .bind(loan_id.value())
                .fetch_one(&mut *tx)
                .await
                .map_err(backend)?;
            return Err(if exists {
                StoreError::LoanAlreadyReturned(loan_id)
            } else {
                StoreError::LoanNotFound(loan_id)
            });
        };
        let loan = map_row_to_loan(&row);

        sqlx::query("UPDATE books SET is_available = TRUE WHERE id = $1")
            .bind(loan.book_id.value())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(loan)
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                book_id,
                member_id,
                loan_date,
                due_date,
                return_date,
                created_at,
                updated_at
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// 消費されるたびにデータベースから行を読み出す
    fn stream(&self, query: LoanQuery) -> BoxStream<'_, Result<Loan>> {
        let pattern = query.search_term().map(|t| like_pattern(&t));

        sqlx::query(STREAM_LOANS_SQL)
            .bind(query.book_id.map(|id| id.value()))
            .bind(query.member_id.map(|id| id.value()))
            .bind(query.status.as_str())
            .bind(query.as_of)
            .bind(pattern)
            .fetch(&self.pool)
            .map(|row| row.map(|r| map_row_to_loan(&r)).map_err(backend))
            .boxed()
    }
}
