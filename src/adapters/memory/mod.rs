mod book_repository;
mod loan_ledger;
mod member_repository;
mod stats_reader;

use crate::domain::{
    book::Book,
    loan::Loan,
    member::Member,
    value_objects::{BookId, Email, LoanId, MemberId},
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;

/// In-memory implementation of every store port.
///
/// Books, members and loans live behind a single lock, which makes that lock
/// the transactional boundary: the availability check and the flip happen in
/// one write-locked section, and stats readers always see a whole state.
/// Critical sections never await.
#[derive(Default)]
pub struct InMemoryLibrary {
    state: RwLock<LibraryState>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Record plus its insertion sequence, used to list in insertion order.
struct Sequenced<T> {
    seq: u64,
    record: T,
}

#[derive(Default)]
struct LibraryState {
    next_seq: u64,
    books: HashMap<BookId, Sequenced<Book>>,
    members: HashMap<MemberId, Sequenced<Member>>,
    loans: HashMap<LoanId, Sequenced<Loan>>,
}

impl LibraryState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn has_open_loan_for_book(&self, book_id: BookId) -> bool {
        self.loans
            .values()
            .any(|l| l.record.book_id == book_id && l.record.is_open())
    }

    fn has_open_loan_for_member(&self, member_id: MemberId) -> bool {
        self.loans
            .values()
            .any(|l| l.record.member_id == member_id && l.record.is_open())
    }

    fn email_taken(&self, email: &Email, except: Option<MemberId>) -> bool {
        let normalized = email.normalized();
        self.members.values().any(|m| {
            Some(m.record.member_id) != except && m.record.email.normalized() == normalized
        })
    }

    /// Case-insensitive match on the book title or member display name.
    fn loan_matches_search(&self, loan: &Loan, term: &str) -> bool {
        let title_match = self
            .books
            .get(&loan.book_id)
            .is_some_and(|b| b.record.title.to_lowercase().contains(term));
        let name_match = self
            .members
            .get(&loan.member_id)
            .is_some_and(|m| m.record.display_name().to_lowercase().contains(term));

        title_match || name_match
    }
}

fn ordered<K, T>(map: &HashMap<K, Sequenced<T>>) -> Vec<T>
where
    K: Eq + Hash,
    T: Clone,
{
    let mut entries: Vec<&Sequenced<T>> = map.values().collect();
    entries.sort_by_key(|e| e.seq);
    entries.into_iter().map(|e| e.record.clone()).collect()
}
