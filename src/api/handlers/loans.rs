use crate::application::loan;
use crate::domain::{commands::ReturnLoan, value_objects::LoanId};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use futures::TryStreamExt;
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    types::{CreateLoanRequest, ListLoansQuery, LoanResponse},
};

// ============================================================================
// Command handlers
// ============================================================================

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - 書籍と会員が存在すること（404）
/// - 書籍が貸出可能であること（409）
/// - 返却期限が貸出日より前でないこと（400）
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    req: Result<Json<CreateLoanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let Json(req) = req?;
    let now = Utc::now();
    let cmd = req.to_command(now)?;

    let created = loan::create_loan(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(LoanResponse::from_loan(created, now))))
}

/// PUT /loans/:id/return - 書籍を返却
///
/// 延滞中の貸出も返却できる。返却済みなら409。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<LoanResponse>, ApiError> {
    let Path(id) = id?;
    let now = Utc::now();

    let cmd = ReturnLoan {
        loan_id: LoanId::from_uuid(id),
        returned_at: now,
    };
    let returned = loan::return_loan(&state.service_deps, cmd).await?;
    Ok(Json(LoanResponse::from_loan(returned, now)))
}

// ============================================================================
// Query handlers
// ============================================================================

/// GET /loans/:id
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<LoanResponse>, ApiError> {
    let Path(id) = id?;
    let found = loan::get_loan(&state.service_deps, LoanId::from_uuid(id)).await?;
    Ok(Json(LoanResponse::from_loan(found, Utc::now())))
}

/// GET /loans - 貸出一覧
///
/// クエリパラメータ（すべて省略可）:
/// - status: all, active, returned, overdue
/// - q: 書籍タイトルまたは会員名の部分一致
/// - book_id, member_id
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListLoansQuery>, QueryRejection>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let Query(query) = query?;
    let now = Utc::now();
    let loan_query = query.to_loan_query(now).map_err(ApiError::BadRequest)?;

    let loans: Vec<LoanResponse> = loan::list_loans(&state.service_deps, loan_query)
        .map_ok(|l| LoanResponse::from_loan(l, now))
        .try_collect()
        .await?;

    Ok(Json(loans))
}
