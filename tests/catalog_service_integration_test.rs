use chrono::Utc;
use rusty_library::application::catalog::{self, CatalogApplicationError};
use rusty_library::application::loan::{create_loan, return_loan};
use rusty_library::domain::{
    ValidationError,
    book::{BookPatch, NewBook},
    commands::{CreateLoan, ReturnLoan},
    member::{MemberPatch, NewMember},
    value_objects::*,
};
use rusty_library::ports::LoanQuery;
use futures::TryStreamExt;

mod common;

use common::{in_memory_deps, register_book, register_member};

fn new_member(email: &str) -> NewMember {
    NewMember {
        first_name: "Victor".to_string(),
        last_name: "Hugo".to_string(),
        email: email.to_string(),
        ..Default::default()
    }
}

// ============================================================================
// 書籍
// ============================================================================

#[tokio::test]
async fn test_register_book_trims_and_starts_available() {
    let deps = in_memory_deps();

    let book = catalog::register_book(
        &deps,
        NewBook {
            title: "  Les Misérables ".to_string(),
            author: "Victor Hugo".to_string(),
            isbn: Some("  ".to_string()),
            publication_year: Some(1862),
            ..Default::default()
        },
        Utc::now(),
    )
    .await
    .unwrap();

    assert_eq!(book.title, "Les Misérables");
    assert_eq!(book.isbn, None);
    assert!(book.is_available);

    let listed = catalog::list_books(&deps).await.unwrap();
    assert_eq!(listed, vec![book]);
}

#[tokio::test]
async fn test_register_book_requires_title_and_author() {
    let deps = in_memory_deps();

    let result = catalog::register_book(
        &deps,
        NewBook {
            title: "   ".to_string(),
            author: "Victor Hugo".to_string(),
            ..Default::default()
        },
        Utc::now(),
    )
    .await;

    assert!(matches!(
        result,
        Err(CatalogApplicationError::Validation(
            ValidationError::MissingField("title")
        ))
    ));
    assert!(catalog::list_books(&deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_book_changes_only_given_fields() {
    let deps = in_memory_deps();
    let book = register_book(&deps, "Hernani").await;

    let updated = catalog::update_book(
        &deps,
        book.book_id,
        BookPatch {
            category: Some("Théâtre".to_string()),
            ..Default::default()
        },
        Utc::now(),
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "Hernani");
    assert_eq!(updated.author, book.author);
    assert_eq!(updated.category.as_deref(), Some("Théâtre"));
}

#[tokio::test]
async fn test_update_book_keeps_availability_owned_by_loans() {
    let deps = in_memory_deps();
    let book = register_book(&deps, "Ruy Blas").await;
    let member = register_member(&deps, "Ruy", "Blas").await;
    create_loan(
        &deps,
        CreateLoan {
            book_id: book.book_id,
            member_id: member.member_id,
            loan_date: None,
            due_date: None,
            requested_at: Utc::now(),
        },
    )
    .await
    .unwrap();

    let updated = catalog::update_book(
        &deps,
        book.book_id,
        BookPatch {
            title: Some("Ruy Blas (édition critique)".to_string()),
            ..Default::default()
        },
        Utc::now(),
    )
    .await
    .unwrap();

    assert!(!updated.is_available);
}

#[tokio::test]
async fn test_unknown_book_is_not_found() {
    let deps = in_memory_deps();

    let result = catalog::get_book(&deps, BookId::new()).await;
    assert!(matches!(result, Err(CatalogApplicationError::BookNotFound)));

    let result =
        catalog::update_book(&deps, BookId::new(), BookPatch::default(), Utc::now()).await;
    assert!(matches!(result, Err(CatalogApplicationError::BookNotFound)));

    let result = catalog::remove_book(&deps, BookId::new()).await;
    assert!(matches!(result, Err(CatalogApplicationError::BookNotFound)));
}

// ============================================================================
// 会員
// ============================================================================

#[tokio::test]
async fn test_register_member_validates_email() {
    let deps = in_memory_deps();

    let result = catalog::register_member(&deps, new_member("not-an-email"), Utc::now()).await;
    assert!(matches!(
        result,
        Err(CatalogApplicationError::Validation(
            ValidationError::InvalidEmail(_)
        ))
    ));

    let result = catalog::register_member(&deps, new_member(""), Utc::now()).await;
    assert!(matches!(
        result,
        Err(CatalogApplicationError::Validation(
            ValidationError::MissingField("email")
        ))
    ));
}

#[tokio::test]
async fn test_email_is_unique_case_insensitively() {
    let deps = in_memory_deps();
    catalog::register_member(&deps, new_member("victor@hugo.fr"), Utc::now())
        .await
        .unwrap();

    let result = catalog::register_member(&deps, new_member("Victor@Hugo.FR"), Utc::now()).await;

    assert!(matches!(
        result,
        Err(CatalogApplicationError::EmailAlreadyRegistered(_))
    ));
    assert_eq!(catalog::list_members(&deps).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_member_cannot_take_another_members_email() {
    let deps = in_memory_deps();
    catalog::register_member(&deps, new_member("victor@hugo.fr"), Utc::now())
        .await
        .unwrap();
    let other = catalog::register_member(&deps, new_member("adele@hugo.fr"), Utc::now())
        .await
        .unwrap();

    let result = catalog::update_member(
        &deps,
        other.member_id,
        MemberPatch {
            email: Some("VICTOR@hugo.fr".to_string()),
            ..Default::default()
        },
        Utc::now(),
    )
    .await;
    assert!(matches!(
        result,
        Err(CatalogApplicationError::EmailAlreadyRegistered(_))
    ));

    // 自分自身のメールアドレスの表記変更は許可する
    let updated = catalog::update_member(
        &deps,
        other.member_id,
        MemberPatch {
            email: Some("Adele@Hugo.fr".to_string()),
            phone: Some("01 23 45 67 89".to_string()),
            ..Default::default()
        },
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(updated.email.as_str(), "Adele@Hugo.fr");
    assert_eq!(updated.phone.as_deref(), Some("01 23 45 67 89"));
}

// ============================================================================
// 削除
// ============================================================================

#[tokio::test]
async fn test_remove_book_with_open_loan_is_rejected() {
    let deps = in_memory_deps();
    let book = register_book(&deps, "Les Burgraves").await;
    let member = register_member(&deps, "Job", "Burgrave").await;
    let loan = create_loan(
        &deps,
        CreateLoan {
            book_id: book.book_id,
            member_id: member.member_id,
            loan_date: None,
            due_date: None,
            requested_at: Utc::now(),
        },
    )
    .await
    .unwrap();

    let result = catalog::remove_book(&deps, book.book_id).await;
    assert!(matches!(result, Err(CatalogApplicationError::BookHasOpenLoans)));

    let result = catalog::remove_member(&deps, member.member_id).await;
    assert!(matches!(
        result,
        Err(CatalogApplicationError::MemberHasOpenLoans)
    ));

    // 返却後は削除でき、返却済みの履歴も消える
    return_loan(
        &deps,
        ReturnLoan {
            loan_id: loan.loan_id,
            returned_at: Utc::now(),
        },
    )
    .await
    .unwrap();
    catalog::remove_book(&deps, book.book_id).await.unwrap();

    let remaining: Vec<_> = rusty_library::application::loan::list_loans(
        &deps,
        LoanQuery::all(Utc::now()),
    )
    .try_collect()
    .await
    .unwrap();
    assert!(remaining.is_empty());
    assert!(matches!(
        catalog::get_book(&deps, book.book_id).await,
        Err(CatalogApplicationError::BookNotFound)
    ));

    catalog::remove_member(&deps, member.member_id).await.unwrap();
    assert!(catalog::list_members(&deps).await.unwrap().is_empty());
}
