use crate::application::catalog;
use crate::domain::value_objects::MemberId;
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
    types::{CreateMemberRequest, MemberResponse, UpdateMemberRequest},
};

/// GET /members
pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = catalog::list_members(&state.service_deps).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

/// GET /members/:id
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let Path(id) = id?;
    let member = catalog::get_member(&state.service_deps, MemberId::from_uuid(id)).await?;
    Ok(Json(MemberResponse::from(member)))
}

/// POST /members - 会員を登録
///
/// 名・姓・メールアドレスは必須。メールアドレスが登録済みなら409。
pub async fn create_member(
    State(state): State<Arc<AppState>>,
    req: Result<Json<CreateMemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let Json(req) = req?;
    let new_member = req.into_new_member()?;

    let member = catalog::register_member(&state.service_deps, new_member, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// PUT /members/:id
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    req: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let Path(id) = id?;
    let Json(req) = req?;

    let member = catalog::update_member(
        &state.service_deps,
        MemberId::from_uuid(id),
        req.into(),
        Utc::now(),
    )
    .await?;
    Ok(Json(MemberResponse::from(member)))
}

/// DELETE /members/:id
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    catalog::remove_member(&state.service_deps, MemberId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
