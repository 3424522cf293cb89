use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, ValidationError, optional_text, required_text};

/// Book集約 - 蔵書1冊
///
/// 不変条件：`is_available` が `false` なのは、この書籍を参照する
/// 未返却の貸出が存在するときに限る。
/// `is_available` を変更できるのは貸出台帳の原子的な操作のみ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新規登録する書籍の入力
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// 書誌情報の部分更新
///
/// `None` の項目は変更しない。貸出可否は含まない。
/// `publication_year` は `Some(None)` で消去する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<Option<i32>>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// 純粋関数：書籍を作成する
///
/// ビジネスルール：
/// - タイトルと著者は必須
/// - 登録直後は貸出可能
pub fn create_book(new_book: NewBook, now: DateTime<Utc>) -> Result<Book, ValidationError> {
    let title = required_text("title", &new_book.title)?;
    let author = required_text("author", &new_book.author)?;

    Ok(Book {
        book_id: BookId::new(),
        title,
        author,
        isbn: optional_text(new_book.isbn),
        publication_year: new_book.publication_year,
        category: optional_text(new_book.category),
        description: optional_text(new_book.description),
        is_available: true,
        created_at: now,
        updated_at: now,
    })
}

/// 純粋関数：書誌情報の部分更新を適用する
pub fn apply_book_patch(
    book: &Book,
    patch: BookPatch,
    now: DateTime<Utc>,
) -> Result<Book, ValidationError> {
    let title = match patch.title {
        Some(title) => required_text("title", &title)?,
        None => book.title.clone(),
    };
    let author = match patch.author {
        Some(author) => required_text("author", &author)?,
        None => book.author.clone(),
    };

    Ok(Book {
        title,
        author,
        isbn: patch.isbn.map_or_else(|| book.isbn.clone(), |v| optional_text(Some(v))),
        publication_year: patch.publication_year.unwrap_or(book.publication_year),
        category: patch
            .category
            .map_or_else(|| book.category.clone(), |v| optional_text(Some(v))),
        description: patch
            .description
            .map_or_else(|| book.description.clone(), |v| optional_text(Some(v))),
        updated_at: now,
        ..book.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_new_book() -> NewBook {
        NewBook {
            title: "Les Misérables".to_string(),
            author: "Victor Hugo".to_string(),
            isbn: Some("978-2-07-040850-4".to_string()),
            publication_year: Some(1862),
            category: Some("Roman".to_string()),
            description: None,
        }
    }

    #[test]
    fn test_create_book_is_available() {
        let now = Utc::now();
        let book = create_book(sample_new_book(), now).unwrap();

        assert!(book.is_available);
        assert_eq!(book.title, "Les Misérables");
        assert_eq!(book.publication_year, Some(1862));
        assert_eq!(book.created_at, now);
        assert_eq!(book.updated_at, now);
    }

    #[test]
    fn test_create_book_requires_title_and_author() {
        let now = Utc::now();

        let missing_title = NewBook {
            title: "  ".to_string(),
            ..sample_new_book()
        };
        assert_eq!(
            create_book(missing_title, now).unwrap_err(),
            ValidationError::MissingField("title")
        );

        let missing_author = NewBook {
            author: String::new(),
            ..sample_new_book()
        };
        assert_eq!(
            create_book(missing_author, now).unwrap_err(),
            ValidationError::MissingField("author")
        );
    }

    #[test]
    fn test_apply_book_patch_keeps_unset_fields() {
        let created_at = Utc::now();
        let book = create_book(sample_new_book(), created_at).unwrap();
        let later = created_at + Duration::minutes(5);

        let patch = BookPatch {
            category: Some("Classique".to_string()),
            ..BookPatch::default()
        };
        let updated = apply_book_patch(&book, patch, later).unwrap();

        assert_eq!(updated.book_id, book.book_id);
        assert_eq!(updated.title, book.title);
        assert_eq!(updated.isbn, book.isbn);
        assert_eq!(updated.category.as_deref(), Some("Classique"));
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[test]
    fn test_apply_book_patch_rejects_blank_title() {
        let book = create_book(sample_new_book(), Utc::now()).unwrap();
        let patch = BookPatch {
            title: Some(" ".to_string()),
            ..BookPatch::default()
        };

        assert_eq!(
            apply_book_patch(&book, patch, Utc::now()).unwrap_err(),
            ValidationError::MissingField("title")
        );
    }

    #[test]
    fn test_apply_book_patch_clears_optional_with_blank() {
        let book = create_book(sample_new_book(), Utc::now()).unwrap();
        let patch = BookPatch {
            isbn: Some(String::new()),
            ..BookPatch::default()
        };

        let updated = apply_book_patch(&book, patch, Utc::now()).unwrap();
        assert_eq!(updated.isbn, None);
    }

    #[test]
    fn test_apply_book_patch_publication_year() {
        let book = create_book(sample_new_book(), Utc::now()).unwrap();
        assert_eq!(book.publication_year, Some(1862));

        let kept = apply_book_patch(&book, BookPatch::default(), Utc::now()).unwrap();
        assert_eq!(kept.publication_year, Some(1862));

        let changed = BookPatch {
            publication_year: Some(Some(1863)),
            ..BookPatch::default()
        };
        let changed = apply_book_patch(&book, changed, Utc::now()).unwrap();
        assert_eq!(changed.publication_year, Some(1863));

        let cleared = BookPatch {
            publication_year: Some(None),
            ..BookPatch::default()
        };
        let cleared = apply_book_patch(&book, cleared, Utc::now()).unwrap();
        assert_eq!(cleared.publication_year, None);
    }
}
