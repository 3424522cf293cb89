use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, MemberId, ValidationError, optional_text, required_text};

/// Member集約 - 図書館の利用者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// 表示名（「名 姓」）。貸出一覧の検索対象になる
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
}

/// 純粋関数：会員を作成する
///
/// ビジネスルール：
/// - 名・姓・メールアドレスは必須
/// - メールアドレスは形式を検証する（一意性はストアが保証する）
pub fn create_member(new_member: NewMember, now: DateTime<Utc>) -> Result<Member, ValidationError> {
    let first_name = required_text("first_name", &new_member.first_name)?;
    let last_name = required_text("last_name", &new_member.last_name)?;
    let email = Email::parse(&new_member.email)?;

    Ok(Member {
        member_id: MemberId::new(),
        first_name,
        last_name,
        email,
        phone: optional_text(new_member.phone),
        address: optional_text(new_member.address),
        id_card_number: optional_text(new_member.id_card_number),
        created_at: now,
        updated_at: now,
    })
}

/// 純粋関数：会員情報の部分更新を適用する
pub fn apply_member_patch(
    member: &Member,
    patch: MemberPatch,
    now: DateTime<Utc>,
) -> Result<Member, ValidationError> {
    let first_name = match patch.first_name {
        Some(v) => required_text("first_name", &v)?,
        None => member.first_name.clone(),
    };
    let last_name = match patch.last_name {
        Some(v) => required_text("last_name", &v)?,
        None => member.last_name.clone(),
    };
    let email = match patch.email {
        Some(v) => Email::parse(&v)?,
        None => member.email.clone(),
    };

    Ok(Member {
        first_name,
        last_name,
        email,
        phone: patch
            .phone
            .map_or_else(|| member.phone.clone(), |v| optional_text(Some(v))),
        address: patch
            .address
            .map_or_else(|| member.address.clone(), |v| optional_text(Some(v))),
        id_card_number: patch
            .id_card_number
            .map_or_else(|| member.id_card_number.clone(), |v| optional_text(Some(v))),
        updated_at: now,
        ..member.clone()
    })
}
