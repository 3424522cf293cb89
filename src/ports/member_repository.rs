use crate::domain::{member::Member, value_objects::MemberId};
use async_trait::async_trait;

pub use super::error::Result;

/// 会員リポジトリポート
///
/// メールアドレスの一意性（大文字小文字を区別しない）はストアが保証する。
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// すべての会員を登録順に返す
    async fn list(&self) -> Result<Vec<Member>>;

    async fn get(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// 新しい会員を保存する
    ///
    /// メールアドレスが登録済みなら `StoreError::EmailTaken`。
    async fn insert(&self, member: Member) -> Result<()>;

    /// 会員情報を更新し、保存後の会員を返す
    ///
    /// 自分以外の会員とメールアドレスが重複する場合は `StoreError::EmailTaken`。
    async fn update(&self, member: Member) -> Result<Member>;

    /// 会員を削除する
    ///
    /// 未返却の貸出がある場合は `StoreError::MemberHasOpenLoans` で拒否する。
    /// 返却済みの貸出履歴は会員と一緒に削除される。
    async fn delete(&self, member_id: MemberId) -> Result<()>;
}
