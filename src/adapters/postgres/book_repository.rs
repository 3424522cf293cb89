use crate::domain::{book::Book, value_objects::BookId};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use crate::ports::error::StoreError;
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::backend;

const BOOK_COLUMNS: &str = r#"
    id,
    title,
    author,
    isbn,
    publication_year,
    category,
    description,
    is_available,
    created_at,
    updated_at
"#;

/// PostgreSQLの行データをBookに変換する
pub(crate) fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        book_id: BookId::from_uuid(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        isbn: row.get("isbn"),
        publication_year: row.get("publication_year"),
        category: row.get("category"),
        description: row.get("description"),
        is_available: row.get("is_available"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn insert(&self, book: Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (
                id,
                title,
                author,
                isbn,
                publication_year,
                category,
                description,
                is_available,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(&book.category)
        .bind(&book.description)
        .bind(book.is_available)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    /// 書誌情報のみ更新する（is_availableには触れない）
    async fn update(&self, book: Book) -> Result<Book> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE books SET
                title = $2,
                author = $3,
                isbn = $4,
                publication_year = $5,
                category = $6,
                description = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(&book.category)
        .bind(&book.description)
        .bind(book.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref()
            .map(map_row_to_book)
            .ok_or(StoreError::BookNotFound(book.book_id))
    }

    /// 書籍行をロックしてから未返却の貸出を確認し、削除する
    ///
    /// 貸出開始も同じ行を `FOR UPDATE` でロックするため、判定と削除の間に
    /// 新しい貸出が割り込むことはない。返却済みの貸出は外部キーの
    /// `ON DELETE CASCADE` で削除される。
    async fn delete(&self, book_id: BookId) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let locked = sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if locked.is_none() {
            return Err(StoreError::BookNotFound(book_id));
        }

        let has_open_loans: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loans WHERE book_id = $1 AND return_date IS NULL)",
        )
        .bind(book_id.value())
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;
        if has_open_loans {
            return Err(StoreError::BookHasOpenLoans(book_id));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(())
    }
}
