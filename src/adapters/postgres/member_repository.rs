use crate::domain::{
    member::Member,
    value_objects::{Email, MemberId},
};
use crate::ports::error::StoreError;
use crate::ports::member_repository::{MemberRepository as MemberRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{backend, invalid_data, violated_unique_constraint};

const MEMBER_COLUMNS: &str = r#"
    id,
    first_name,
    last_name,
    email,
    phone,
    address,
    id_card_number,
    created_at,
    updated_at
"#;

const EMAIL_UNIQUE_INDEX: &str = "members_email_lower_idx";

/// PostgreSQLの行データをMemberに変換する
///
/// メールアドレスは値オブジェクトとして再検証する。
fn map_row_to_member(row: &PgRow) -> Result<Member> {
    let email: String = row.get("email");
    let email = Email::parse(&email)
        .map_err(|e| invalid_data(format!("stored member email is invalid: {}", e)))?;

    Ok(Member {
        member_id: MemberId::from_uuid(row.get("id")),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email,
        phone: row.get("phone"),
        address: row.get("address"),
        id_card_number: row.get("id_card_number"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// 一意制約違反をEmailTakenに変換する
fn map_write_error(err: sqlx::Error, email: &Email) -> StoreError {
    match violated_unique_constraint(&err) {
        Some(constraint) if constraint == EMAIL_UNIQUE_INDEX => {
            StoreError::EmailTaken(email.to_string())
        }
        _ => backend(err),
    }
}

/// MemberRepositoryのPostgreSQL実装
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn list(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(map_row_to_member).collect()
    }

    async fn get(&self, member_id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(map_row_to_member).transpose()
    }

    async fn insert(&self, member: Member) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id,
                first_name,
                last_name,
                email,
                phone,
                address,
                id_card_number,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(member.member_id.value())
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(member.email.as_str())
        .bind(&member.phone)
        .bind(&member.address)
        .bind(&member.id_card_number)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &member.email))?;

        Ok(())
    }

    async fn update(&self, member: Member) -> Result<Member> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE members SET
                first_name = $2,
                last_name = $3,
                email = $4,
                phone = $5,
                address = $6,
                id_card_number = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(member.member_id.value())
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(member.email.as_str())
        .bind(&member.phone)
        .bind(&member.address)
        .bind(&member.id_card_number)
        .bind(member.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &member.email))?;

        match row {
            Some(row) => map_row_to_member(&row),
            None => Err(StoreError::MemberNotFound(member.member_id)),
        }
    }

    /// 会員行を `FOR UPDATE` でロックして削除する
    ///
    /// 貸出開始は会員行を `FOR SHARE` でロックするため、両者は直列化される。
    async fn delete(&self, member_id: MemberId) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let locked = sqlx::query("SELECT id FROM members WHERE id = $1 FOR UPDATE")
            .bind(member_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if locked.is_none() {
            return Err(StoreError::MemberNotFound(member_id));
        }

        let has_open_loans: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loans WHERE member_id = $1 AND return_date IS NULL)",
        )
        .bind(member_id.value())
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;
        if has_open_loans {
            return Err(StoreError::MemberHasOpenLoans(member_id));
        }

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id.value())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(())
    }
}
