use crate::domain::{
    ReturnLoanError,
    loan::{self, Loan},
    value_objects::LoanId,
};
use crate::ports::error::StoreError;
use crate::ports::loan_ledger::{LoanLedger, LoanQuery, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};

use super::{InMemoryLibrary, Sequenced};

impl InMemoryLibrary {
    fn matching_loans(&self, query: &LoanQuery) -> Vec<Loan> {
        let state = self.state.read();
        let term = query.search_term();

        let mut matches: Vec<&Sequenced<Loan>> = state
            .loans
            .values()
            .filter(|l| query.matches_loan(&l.record))
            .filter(|l| {
                term.as_deref()
                    .is_none_or(|t| state.loan_matches_search(&l.record, t))
            })
            .collect();
        matches.sort_by_key(|l| l.seq);

        matches.into_iter().map(|l| l.record.clone()).collect()
    }
}

#[async_trait]
impl LoanLedger for InMemoryLibrary {
    async fn open(&self, loan: Loan) -> Result<Loan> {
        let mut state = self.state.write();

        let book = state
            .books
            .get(&loan.book_id)
            .ok_or(StoreError::BookNotFound(loan.book_id))?;
        let is_available = book.record.is_available;

        if !state.members.contains_key(&loan.member_id) {
            return Err(StoreError::MemberNotFound(loan.member_id));
        }
        if !is_available {
            return Err(StoreError::BookNotAvailable(loan.book_id));
        }

        if let Some(book) = state.books.get_mut(&loan.book_id) {
            book.record.is_available = false;
        }
        let seq = state.next_seq();
        state.loans.insert(
            loan.loan_id,
            Sequenced {
                seq,
                record: loan.clone(),
            },
        );

        Ok(loan)
    }

    async fn close(&self, loan_id: LoanId, returned_at: DateTime<Utc>) -> Result<Loan> {
        let mut state = self.state.write();

        let stored = state
            .loans
            .get_mut(&loan_id)
            .ok_or(StoreError::LoanNotFound(loan_id))?;
        let returned = loan::return_loan(&stored.record, returned_at).map_err(|e| match e {
            ReturnLoanError::AlreadyReturned => StoreError::LoanAlreadyReturned(loan_id),
        })?;
        stored.record = returned.clone();

        if let Some(book) = state.books.get_mut(&returned.book_id) {
            book.record.is_available = true;
        }

        Ok(returned)
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self
            .state
            .read()
            .loans
            .get(&loan_id)
            .map(|l| l.record.clone()))
    }

    /// Takes its snapshot on first poll, so each call can be replayed.
    fn stream(&self, query: LoanQuery) -> BoxStream<'_, Result<Loan>> {
        stream::once(async move { self.matching_loans(&query) })
            .flat_map(|loans| stream::iter(loans.into_iter().map(Ok)))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        book::{NewBook, create_book},
        member::{NewMember, create_member},
        value_objects::{BookId, MemberId},
    };
    use crate::ports::{BookRepository, MemberRepository, StatsReader};
    use futures::TryStreamExt;

    async fn seeded_library() -> (InMemoryLibrary, BookId, MemberId) {
        let library = InMemoryLibrary::new();
        let now = Utc::now();

        let book = create_book(
            NewBook {
                title: "Le Petit Prince".to_string(),
                author: "Antoine de Saint-Exupéry".to_string(),
                ..NewBook::default()
            },
            now,
        )
        .unwrap();
        let member = create_member(
            NewMember {
                first_name: "Albert".to_string(),
                last_name: "Camus".to_string(),
                email: "albert.camus@example.fr".to_string(),
                ..NewMember::default()
            },
            now,
        )
        .unwrap();

        let (book_id, member_id) = (book.book_id, member.member_id);
        BookRepository::insert(&library, book).await.unwrap();
        MemberRepository::insert(&library, member).await.unwrap();

        (library, book_id, member_id)
    }

    fn new_loan(book_id: BookId, member_id: MemberId) -> Loan {
        let now = Utc::now();
        loan::open_loan(book_id, member_id, now, None, now).unwrap()
    }

    #[tokio::test]
    async fn test_open_flips_availability() {
        let (library, book_id, member_id) = seeded_library().await;

        library.open(new_loan(book_id, member_id)).await.unwrap();

        let book = BookRepository::get(&library, book_id).await.unwrap().unwrap();
        assert!(!book.is_available);
    }

    #[tokio::test]
    async fn test_open_rejects_unavailable_book() {
        let (library, book_id, member_id) = seeded_library().await;
        library.open(new_loan(book_id, member_id)).await.unwrap();

        let result = library.open(new_loan(book_id, member_id)).await;
        assert!(matches!(result, Err(StoreError::BookNotAvailable(id)) if id == book_id));

        let stats = library.snapshot().await.unwrap();
        assert_eq!(stats.active_loans, 1);
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_references() {
        let (library, book_id, member_id) = seeded_library().await;

        let unknown_book = BookId::new();
        let result = library.open(new_loan(unknown_book, member_id)).await;
        assert!(matches!(result, Err(StoreError::BookNotFound(id)) if id == unknown_book));

        let unknown_member = MemberId::new();
        let result = library.open(new_loan(book_id, unknown_member)).await;
        assert!(matches!(result, Err(StoreError::MemberNotFound(id)) if id == unknown_member));

        // 失敗した操作は何も変更しない
        let book = BookRepository::get(&library, book_id).await.unwrap().unwrap();
        assert!(book.is_available);
    }

    #[tokio::test]
    async fn test_close_twice_is_rejected() {
        let (library, book_id, member_id) = seeded_library().await;
        let loan = library.open(new_loan(book_id, member_id)).await.unwrap();

        let returned = library.close(loan.loan_id, Utc::now()).await.unwrap();
        assert!(returned.is_returned());

        let result = library.close(loan.loan_id, Utc::now()).await;
        assert!(matches!(result, Err(StoreError::LoanAlreadyReturned(_))));

        let book = BookRepository::get(&library, book_id).await.unwrap().unwrap();
        assert!(book.is_available);
    }

    #[tokio::test]
    async fn test_stream_is_restartable_and_ordered() {
        let (library, book_id, member_id) = seeded_library().await;
        let first = library.open(new_loan(book_id, member_id)).await.unwrap();
        library.close(first.loan_id, Utc::now()).await.unwrap();
        let second = library.open(new_loan(book_id, member_id)).await.unwrap();

        let query = LoanQuery::all(Utc::now());
        let run_one: Vec<Loan> = library.stream(query.clone()).try_collect().await.unwrap();
        let run_two: Vec<Loan> = library.stream(query).try_collect().await.unwrap();

        let ids: Vec<LoanId> = run_one.iter().map(|l| l.loan_id).collect();
        assert_eq!(ids, vec![first.loan_id, second.loan_id]);
        assert_eq!(run_one, run_two);
    }

    #[tokio::test]
    async fn test_delete_book_cascades_closed_history() {
        let (library, book_id, member_id) = seeded_library().await;
        let loan = library.open(new_loan(book_id, member_id)).await.unwrap();

        let result = BookRepository::delete(&library, book_id).await;
        assert!(matches!(result, Err(StoreError::BookHasOpenLoans(_))));

        library.close(loan.loan_id, Utc::now()).await.unwrap();
        BookRepository::delete(&library, book_id).await.unwrap();

        assert!(LoanLedger::get(&library, loan.loan_id).await.unwrap().is_none());
    }
}
