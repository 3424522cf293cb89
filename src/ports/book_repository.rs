use crate::domain::{book::Book, value_objects::BookId};
use async_trait::async_trait;

pub use super::error::Result;

/// 書籍リポジトリポート（カタログ）
///
/// 書誌情報の永続化を抽象化する。
/// 貸出可否（`is_available`）は貸出台帳だけが変更する。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// すべての書籍を登録順に返す
    async fn list(&self) -> Result<Vec<Book>>;

    /// IDで書籍を取得する
    async fn get(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 新しい書籍を保存する
    async fn insert(&self, book: Book) -> Result<()>;

    /// 書誌情報を更新し、保存後の書籍を返す
    ///
    /// 引数の `is_available` は無視され、ストア上の現在値が保たれる。
    /// 書籍が存在しない場合は `StoreError::BookNotFound`。
    async fn update(&self, book: Book) -> Result<Book>;

    /// 書籍を削除する
    ///
    /// 未返却の貸出がある場合は `StoreError::BookHasOpenLoans` で拒否する。
    /// 返却済みの貸出履歴は書籍と一緒に削除される。
    /// 判定と削除は貸出の開始に対して原子的に行われる。
    async fn delete(&self, book_id: BookId) -> Result<()>;
}
