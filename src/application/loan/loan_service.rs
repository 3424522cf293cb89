use crate::application::ServiceDependencies;
use crate::domain::{self, commands::*, loan::Loan, value_objects::*};
use crate::ports::LoanQuery;
use futures::stream::{BoxStream, StreamExt};

use super::errors::{LoanApplicationError, Result};

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍と会員が存在すること
/// - 書籍が貸出可能であること
/// - 貸出日の指定がなければ受付時刻、返却期限の指定がなければ貸出日 + 14日間
///
/// 貸出可否の確認と書籍の更新は `LoanLedger::open` の中で不可分に行われる。
/// 同じ書籍への同時貸出は1件だけが成功し、残りは `BookNotAvailable` になる。
#[tracing::instrument(skip(deps), fields(book_id = %cmd.book_id, member_id = %cmd.member_id))]
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<Loan> {
    // 1. ドメイン層の純粋関数で貸出を組み立てる（日付の検証を含む）
    let loan_date = cmd.loan_date.unwrap_or(cmd.requested_at);
    let loan = domain::loan::open_loan(
        cmd.book_id,
        cmd.member_id,
        loan_date,
        cmd.due_date,
        cmd.requested_at,
    )?;

    // 2. 台帳に記録する（存在確認・貸出可否・フラグ更新は原子的）
    match deps.loans.open(loan).await {
        Ok(loan) => {
            tracing::info!(loan_id = %loan.loan_id, due_date = %loan.due_date, "loan created");
            Ok(loan)
        }
        Err(err) => {
            let err = LoanApplicationError::from(err);
            if !matches!(err, LoanApplicationError::StoreError(_)) {
                tracing::warn!(reason = %err, "loan rejected");
            }
            Err(err)
        }
    }
}

/// 書籍を返却する
///
/// 延滞していても返却は受け付ける。
/// 返却済みの貸出は `LoanAlreadyReturned` になり、書籍の状態は変わらない。
#[tracing::instrument(skip(deps), fields(loan_id = %cmd.loan_id))]
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<Loan> {
    match deps.loans.close(cmd.loan_id, cmd.returned_at).await {
        Ok(loan) => {
            tracing::info!(book_id = %loan.book_id, "loan returned");
            Ok(loan)
        }
        Err(err) => {
            let err = LoanApplicationError::from(err);
            if !matches!(err, LoanApplicationError::StoreError(_)) {
                tracing::warn!(reason = %err, "return rejected");
            }
            Err(err)
        }
    }
}

/// IDで貸出を取得する
pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loans
        .get(loan_id)
        .await?
        .ok_or(LoanApplicationError::LoanNotFound)
}

/// 条件に一致する貸出を登録順に返す
///
/// ストリームは遅延評価で、呼び出すたびに最初から読み直す。
pub fn list_loans(
    deps: &ServiceDependencies,
    query: LoanQuery,
) -> BoxStream<'_, Result<Loan>> {
    tracing::debug!(status = query.status.as_str(), "listing loans");

    deps.loans
        .stream(query)
        .map(|item| item.map_err(LoanApplicationError::from))
        .boxed()
}
