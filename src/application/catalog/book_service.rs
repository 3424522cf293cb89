use crate::application::ServiceDependencies;
use crate::domain::{
    self,
    book::{Book, BookPatch, NewBook},
    value_objects::BookId,
};
use chrono::{DateTime, Utc};

use super::errors::{CatalogApplicationError, Result};

/// すべての書籍を登録順に返す
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    Ok(deps.books.list().await?)
}

/// IDで書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.books
        .get(book_id)
        .await?
        .ok_or(CatalogApplicationError::BookNotFound)
}

/// 書籍を登録する（登録直後は貸出可能）
#[tracing::instrument(skip(deps, new_book), fields(title = %new_book.title))]
pub async fn register_book(
    deps: &ServiceDependencies,
    new_book: NewBook,
    now: DateTime<Utc>,
) -> Result<Book> {
    let book = domain::book::create_book(new_book, now)?;
    deps.books.insert(book.clone()).await?;

    tracing::info!(book_id = %book.book_id, "book registered");
    Ok(book)
}

/// 書誌情報を部分更新する
///
/// 指定のない項目は変更しない。貸出可否は貸出台帳だけが変更する。
#[tracing::instrument(skip(deps, patch))]
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    patch: BookPatch,
    now: DateTime<Utc>,
) -> Result<Book> {
    let current = get_book(deps, book_id).await?;
    let updated = domain::book::apply_book_patch(&current, patch, now)?;
    let saved = deps.books.update(updated).await?;

    tracing::info!("book updated");
    Ok(saved)
}

/// 書籍を削除する
///
/// 未返却の貸出があれば拒否する。返却済みの履歴は一緒に削除される。
#[tracing::instrument(skip(deps))]
pub async fn remove_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    match deps.books.delete(book_id).await {
        Ok(()) => {
            tracing::info!("book removed");
            Ok(())
        }
        Err(err) => {
            let err = CatalogApplicationError::from(err);
            if matches!(err, CatalogApplicationError::BookHasOpenLoans) {
                tracing::warn!("book removal rejected: open loans");
            }
            Err(err)
        }
    }
}
