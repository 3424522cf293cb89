use crate::application::ServiceDependencies;
use crate::domain::{
    self,
    member::{Member, MemberPatch, NewMember},
    value_objects::MemberId,
};
use chrono::{DateTime, Utc};

use super::errors::{CatalogApplicationError, Result};

pub async fn list_members(deps: &ServiceDependencies) -> Result<Vec<Member>> {
    Ok(deps.members.list().await?)
}

pub async fn get_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    deps.members
        .get(member_id)
        .await?
        .ok_or(CatalogApplicationError::MemberNotFound)
}

/// 会員を登録する
///
/// ビジネスルール：
/// - 名・姓・メールアドレスは必須
/// - メールアドレスは大文字小文字を区別せず一意
#[tracing::instrument(skip(deps, new_member))]
pub async fn register_member(
    deps: &ServiceDependencies,
    new_member: NewMember,
    now: DateTime<Utc>,
) -> Result<Member> {
    let member = domain::member::create_member(new_member, now)?;

    if let Err(err) = deps.members.insert(member.clone()).await {
        let err = CatalogApplicationError::from(err);
        if matches!(err, CatalogApplicationError::EmailAlreadyRegistered(_)) {
            tracing::warn!("member registration rejected: email already registered");
        }
        return Err(err);
    }

    tracing::info!(member_id = %member.member_id, "member registered");
    Ok(member)
}

/// 会員情報を部分更新する
#[tracing::instrument(skip(deps, patch))]
pub async fn update_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
    patch: MemberPatch,
    now: DateTime<Utc>,
) -> Result<Member> {
    let current = get_member(deps, member_id).await?;
    let updated = domain::member::apply_member_patch(&current, patch, now)?;
    let saved = deps.members.update(updated).await?;

    tracing::info!("member updated");
    Ok(saved)
}

/// 会員を削除する
///
/// 未返却の貸出があれば拒否する。返却済みの履歴は一緒に削除される。
#[tracing::instrument(skip(deps))]
pub async fn remove_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<()> {
    match deps.members.delete(member_id).await {
        Ok(()) => {
            tracing::info!("member removed");
            Ok(())
        }
        Err(err) => {
            let err = CatalogApplicationError::from(err);
            if matches!(err, CatalogApplicationError::MemberHasOpenLoans) {
                tracing::warn!("member removal rejected: open loans");
            }
            Err(err)
        }
    }
}
