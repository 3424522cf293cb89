use crate::application::catalog;
use crate::domain::value_objects::BookId;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    types::{BookResponse, CreateBookRequest, UpdateBookRequest},
};

/// GET /books
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = catalog::list_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let Path(id) = id?;
    let book = catalog::get_book(&state.service_deps, BookId::from_uuid(id)).await?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /books - 書籍を登録
///
/// タイトルと著者は必須。登録直後は貸出可能。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    req: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let Json(req) = req?;
    let new_book = req.into_new_book()?;

    let book = catalog::register_book(&state.service_deps, new_book, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /books/:id - 書誌情報を更新
///
/// `is_available` は貸出・返却でのみ変わるため、送られても無視する。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    req: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let Path(id) = id?;
    let Json(req) = req?;

    let book = catalog::update_book(
        &state.service_deps,
        BookId::from_uuid(id),
        req.into(),
        Utc::now(),
    )
    .await?;
    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id
///
/// 未返却の貸出がある書籍は削除できない（409）。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    catalog::remove_book(&state.service_deps, BookId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
